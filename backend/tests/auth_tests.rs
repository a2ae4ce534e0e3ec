mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use common::{TestSetup, PROJECT_ID, TEST_API_KEY, TEST_KID};
use http::{Request, StatusCode};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn claims(sub: &str) -> serde_json::Value {
    json!({
        "sub": sub,
        "aud": PROJECT_ID,
        "iss": format!("https://securetoken.google.com/{PROJECT_ID}"),
        "iat": now(),
        "exp": now() + 3600,
        "name": "Sam",
        "picture": "https://example.com/sam.png",
    })
}

/// Signs claims with the fixture key, as Firebase would
fn sign(claims: &serde_json::Value) -> String {
    let key = EncodingKey::from_rsa_pem(include_bytes!("fixtures/firebase_test_key.pem")).unwrap();
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    encode(&header, claims, &key).unwrap()
}

mod firebase_tokens {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_valid_token_seeds_new_profile() {
        let context = TestSetup::with_auth();
        let token = sign(&claims("firebase-user-1"));

        let response = context
            .send_get_request("/user/firebase-user-1", Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = TestSetup::parse_response_body(response).await;
        assert_eq!(body["userID"], "firebase-user-1");
        assert_eq!(body["displayName"], "Sam");
        assert_eq!(body["profilePhotoURL"], "https://example.com/sam.png");
    }

    #[tokio::test]
    async fn test_token_subject_must_match_path() {
        let context = TestSetup::with_auth();
        let token = sign(&claims("firebase-user-1"));

        let response = context
            .send_get_request("/user/firebase-user-2", Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let context = TestSetup::with_auth();

        let response = context.send_get_request("/newImage", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = TestSetup::parse_response_body(response).await;
        assert_eq!(body["code"], "missing_token");
    }

    #[tokio::test]
    async fn test_user_id_is_not_a_token_when_auth_enabled() {
        let context = TestSetup::with_auth();

        let response = context
            .send_get_request("/user/firebase-user-1", Some("firebase-user-1"))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = TestSetup::parse_response_body(response).await;
        assert_eq!(body["code"], "invalid_token");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let context = TestSetup::with_auth();
        let mut expired = claims("firebase-user-1");
        expired["iat"] = json!(now() - 7200);
        expired["exp"] = json!(now() - 3600);

        let response = context
            .send_get_request("/newImage", Some(&sign(&expired)))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_other_project() {
        let context = TestSetup::with_auth();
        let mut foreign = claims("firebase-user-1");
        foreign["aud"] = json!("another-project");

        let response = context
            .send_get_request("/newImage", Some(&sign(&foreign)))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_routes_need_no_token() {
        let context = TestSetup::with_auth();

        for route in ["/", "/roasts", "/userReviews/firebase-user-1"] {
            let response = context.send_get_request(route, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{route}");
        }
    }
}

mod api_key {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roast() -> serde_json::Value {
        json!({"name": "Sunday Carvery", "imageURL": "", "priceRange": 2})
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let context = TestSetup::new();

        let response = context.send_admin_request("/roast", None, roast()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = TestSetup::parse_response_body(response).await;
        assert_eq!(body["error"], "API key is missing");
        assert!(context.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_wrong_api_key() {
        let context = TestSetup::new();

        let response = context
            .send_admin_request("/deleteRoast", Some("guess"), json!({"name": "Sunday Carvery"}))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = TestSetup::parse_response_body(response).await;
        assert_eq!(body["error"], "Invalid API key");
    }

    #[tokio::test]
    async fn test_bearer_token_does_not_replace_api_key() {
        let context = TestSetup::new();

        let response = context
            .send_post_request("/roast", Some("user-1"), roast())
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_api_key() {
        let context = TestSetup::new();

        let response = context
            .send_admin_request("/roast", Some(TEST_API_KEY), roast())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

mod correlation_id {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_correlation_id_generated() {
        let context = TestSetup::new();

        let response = context.send_get_request("/", None).await;
        let correlation_id = response
            .headers()
            .get("x-correlation-id")
            .and_then(|value| value.to_str().ok())
            .unwrap();

        assert!(uuid::Uuid::parse_str(correlation_id).is_ok());
    }

    #[tokio::test]
    async fn test_incoming_correlation_id_kept() {
        let context = TestSetup::new();

        let request = Request::builder()
            .uri("/roasts")
            .header("x-correlation-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = context.send(request).await;

        assert_eq!(response.headers()["x-correlation-id"], "abc-123");
    }
}

#[tokio::test]
async fn test_health() {
    let context = TestSetup::new();

    let response = context.send_get_request("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_served_locally() {
    let context = TestSetup::new();

    let response = context.send_get_request("/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = TestSetup::parse_response_body(response).await;
    assert!(body["paths"]["/review"].is_object());
}
