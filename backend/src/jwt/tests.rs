use super::*;
use jsonwebtoken::{encode, EncodingKey, Header};

const PROJECT_ID: &str = "roasts-test";
const TEST_KID: &str = "test-kid";

mod test_helpers {
    use super::*;

    /// Public half of `tests/fixtures/firebase_test_key.pem`
    pub const TEST_KEY_MODULUS: &str = "yjSUiJlbTgLDYrJTPS5hPLz0eJnmbTciYOMxtAmVdBY969cL6DkYvN5O6BzHRNrNQE5dgJG1L14ZsKk-ogej6gY4ieW3Q5blKCqphoGRHU6lecv7-rR6A8ZJ_4sEmT4mHM0NXocV3cH0J0vkrAaqDVX93G6K1VG3SROiWJcNBZpvsKOPLr3NtSPe3P_4nD__Mk66ZIpQ7aCGy1xocPrsQR3s2IYpez1yPeWJjEI3bgdxyYaHrtu3Y8Km4wn4Z_UX5_VENj08zpBHvmF6XnV_yfuk-mhCrd6HLnYvJIppr2nrvEeGJQq6v0m0vDpHwtWgw-nZq3w8iEg62nvExMlA5Q";

    pub fn test_jwk_set() -> JwkSet {
        serde_json::from_value(serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "kid": TEST_KID,
                "alg": "RS256",
                "use": "sig",
                "n": TEST_KEY_MODULUS,
                "e": "AQAB"
            }]
        }))
        .unwrap()
    }

    pub fn verifier() -> FirebaseVerifier {
        FirebaseVerifier::with_jwks(PROJECT_ID.to_string(), &test_jwk_set())
    }

    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    pub fn valid_claims() -> FirebaseClaims {
        FirebaseClaims {
            sub: "firebase-user-1".to_string(),
            aud: PROJECT_ID.to_string(),
            iss: format!("https://securetoken.google.com/{PROJECT_ID}"),
            exp: now() + 3600,
            iat: now(),
            name: Some("Sam".to_string()),
            picture: Some("https://example.com/sam.png".to_string()),
            email: None,
        }
    }

    /// Signs claims with the fixture key, as Firebase would
    pub fn sign(claims: &FirebaseClaims, kid: Option<&str>) -> String {
        let pem = include_bytes!("../../tests/fixtures/firebase_test_key.pem");
        let key = EncodingKey::from_rsa_pem(pem).unwrap();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(ToString::to_string);
        encode(&header, claims, &key).unwrap()
    }
}

mod verification {
    use super::test_helpers::*;
    use super::*;

    #[tokio::test]
    async fn test_accepts_valid_token() {
        let claims = valid_claims();
        let token = sign(&claims, Some(TEST_KID));

        let verified = verifier().verify(&token).await.unwrap();
        assert_eq!(verified, claims);
    }

    #[tokio::test]
    async fn test_rejects_wrong_audience() {
        let claims = FirebaseClaims {
            aud: "someone-else".to_string(),
            ..valid_claims()
        };
        let token = sign(&claims, Some(TEST_KID));

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_wrong_issuer() {
        let claims = FirebaseClaims {
            iss: "https://securetoken.google.com/someone-else".to_string(),
            ..valid_claims()
        };
        let token = sign(&claims, Some(TEST_KID));

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let claims = FirebaseClaims {
            exp: now() - 3600,
            iat: now() - 7200,
            ..valid_claims()
        };
        let token = sign(&claims, Some(TEST_KID));

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_empty_subject() {
        let claims = FirebaseClaims {
            sub: String::new(),
            ..valid_claims()
        };
        let token = sign(&claims, Some(TEST_KID));

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::MissingSubject)
        ));
    }

    #[tokio::test]
    async fn test_rejects_tampered_payload() {
        let token = sign(&valid_claims(), Some(TEST_KID));
        let other = sign(
            &FirebaseClaims {
                sub: "attacker".to_string(),
                ..valid_claims()
            },
            Some(TEST_KID),
        );

        // header and signature of one token around the payload of another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(
            verifier().verify(&forged).await,
            Err(JwtError::Invalid(_))
        ));
    }
}

mod key_selection {
    use super::test_helpers::*;
    use super::*;

    #[tokio::test]
    async fn test_rejects_missing_kid() {
        let token = sign(&valid_claims(), None);

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::MissingKeyId)
        ));
    }

    #[tokio::test]
    async fn test_rejects_unknown_kid() {
        let token = sign(&valid_claims(), Some("rotated-away"));

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::UnknownKeyId(kid)) if kid == "rotated-away"
        ));
    }

    #[tokio::test]
    async fn test_rejects_symmetric_algorithm() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(TEST_KID.to_string());
        let token = encode(
            &header,
            &valid_claims(),
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        assert!(matches!(
            verifier().verify(&token).await,
            Err(JwtError::UnsupportedAlgorithm(Algorithm::HS256))
        ));
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        for token in ["", "not-a-jwt", "a.b.c", "..."] {
            assert!(
                matches!(verifier().verify(token).await, Err(JwtError::Malformed(_))),
                "should reject {token:?}"
            );
        }
    }

    #[test]
    fn test_key_cache_skips_keys_without_kid() {
        let jwk_set: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "n": TEST_KEY_MODULUS,
                "e": "AQAB"
            }]
        }))
        .unwrap();

        assert!(KeyCache::from_jwk_set(&jwk_set).keys_by_kid.is_empty());
        assert_eq!(KeyCache::from_jwk_set(&test_jwk_set()).keys_by_kid.len(), 1);
    }
}
