use std::collections::HashMap;
use std::time::Instant;

use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use serde::{Deserialize, Serialize};

/// Claims of a Firebase ID token that the API relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// Firebase user ID
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: u64,
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Decoding keys indexed by `kid`
pub struct KeyCache {
    pub keys_by_kid: HashMap<String, DecodingKey>,
    /// Last successful fetch; `None` until the first one
    pub fetched_at: Option<Instant>,
    /// Last fetch attempt, successful or not
    pub last_refresh_attempt: Option<Instant>,
}

impl KeyCache {
    pub fn empty() -> Self {
        Self {
            keys_by_kid: HashMap::new(),
            fetched_at: None,
            last_refresh_attempt: None,
        }
    }

    /// Builds a cache from a key set; keys without a `kid` or not usable for RS256 are skipped
    pub fn from_jwk_set(jwk_set: &JwkSet) -> Self {
        let mut keys_by_kid = HashMap::new();

        for jwk in &jwk_set.keys {
            let Some(kid) = &jwk.common.key_id else {
                continue;
            };

            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys_by_kid.insert(kid.clone(), key);
                }
                Err(e) => {
                    tracing::debug!("Skipping JWK {kid}: {e}");
                }
            }
        }

        let now = Instant::now();
        Self {
            keys_by_kid,
            fetched_at: Some(now),
            last_refresh_attempt: Some(now),
        }
    }
}
