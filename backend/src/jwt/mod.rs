//! Firebase ID token verification
//!
//! Firebase signs ID tokens with RS256 using rotating Google-managed keys published as a
//! JWK set. Tokens are accepted when:
//! - the header names a known `kid` and `alg = "RS256"`
//! - the signature verifies against that key
//! - `aud` is the Firebase project ID and `iss` is `https://securetoken.google.com/<project>`
//! - `exp` is in the future and `sub` is non-empty
//!
//! Keys are cached for 24 hours. An unknown `kid` triggers a refresh, at most once a
//! minute, so key rotation is picked up without hammering Google.

pub mod error;
mod types;

use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;

pub use error::JwtError;
pub use types::FirebaseClaims;
use types::KeyCache;

/// Google's published signing keys for Firebase ID tokens
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// How long fetched keys are trusted without a refresh
const KEY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum time between two key set fetches
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout for key set fetches
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

enum KeySource {
    Remote { client: reqwest::Client, url: String },
    /// Fixed key set, never refreshed
    Static,
}

/// Verifies Firebase ID tokens for one project
pub struct FirebaseVerifier {
    project_id: String,
    source: KeySource,
    cache: RwLock<KeyCache>,
}

impl FirebaseVerifier {
    /// Creates a verifier fetching keys from Google on demand
    ///
    /// # Errors
    ///
    /// Returns `JwtError::JwksFetch` if the HTTP client cannot be built
    pub fn new(project_id: String) -> Result<Self, JwtError> {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| JwtError::JwksFetch(e.to_string()))?;

        tracing::info!("Firebase verifier initialized for project {project_id}");

        Ok(Self {
            project_id,
            source: KeySource::Remote {
                client,
                url: GOOGLE_JWKS_URL.to_string(),
            },
            cache: RwLock::new(KeyCache::empty()),
        })
    }

    /// Creates a verifier that only trusts the given keys
    #[must_use]
    pub fn with_jwks(project_id: String, jwk_set: &JwkSet) -> Self {
        Self {
            project_id,
            source: KeySource::Static,
            cache: RwLock::new(KeyCache::from_jwk_set(jwk_set)),
        }
    }

    /// Issuer Firebase stamps on this project's tokens
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Verifies a token and returns its claims
    ///
    /// # Errors
    ///
    /// Returns `JwtError` describing why the token was rejected
    pub async fn verify(&self, token: &str) -> Result<FirebaseClaims, JwtError> {
        let header = decode_header(token).map_err(JwtError::Malformed)?;

        if header.alg != Algorithm::RS256 {
            return Err(JwtError::UnsupportedAlgorithm(header.alg));
        }

        let kid = header.kid.ok_or(JwtError::MissingKeyId)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);

        let claims = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(JwtError::Invalid)?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(JwtError::MissingSubject);
        }

        Ok(claims)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwtError> {
        {
            let cache = self.cache.read().await;
            let fresh = cache
                .fetched_at
                .is_some_and(|fetched_at| fetched_at.elapsed() < KEY_CACHE_TTL);

            if let Some(key) = cache.keys_by_kid.get(kid) {
                if fresh || matches!(self.source, KeySource::Static) {
                    return Ok(key.clone());
                }
            }
        }

        match &self.source {
            KeySource::Static => Err(JwtError::UnknownKeyId(kid.to_string())),
            KeySource::Remote { client, url } => self.refresh_and_lookup(client, url, kid).await,
        }
    }

    async fn refresh_and_lookup(
        &self,
        client: &reqwest::Client,
        url: &str,
        kid: &str,
    ) -> Result<DecodingKey, JwtError> {
        // Stamped under the write lock: concurrent misses fetch once
        {
            let mut cache = self.cache.write().await;
            let rate_limited = cache
                .last_refresh_attempt
                .is_some_and(|attempt| attempt.elapsed() < MIN_REFRESH_INTERVAL);

            if rate_limited {
                return cache
                    .keys_by_kid
                    .get(kid)
                    .cloned()
                    .ok_or_else(|| JwtError::UnknownKeyId(kid.to_string()));
            }
            cache.last_refresh_attempt = Some(Instant::now());
        }

        let jwk_set = match fetch_jwks(client, url).await {
            Ok(jwk_set) => jwk_set,
            Err(e) => {
                tracing::warn!("Failed to refresh Firebase signing keys: {e}");
                // Fall back to the stale key, if any
                return self
                    .cache
                    .read()
                    .await
                    .keys_by_kid
                    .get(kid)
                    .cloned()
                    .ok_or(e);
            }
        };

        let fresh = KeyCache::from_jwk_set(&jwk_set);
        let key = fresh.keys_by_kid.get(kid).cloned();
        tracing::info!("Cached {} Firebase signing keys", fresh.keys_by_kid.len());
        *self.cache.write().await = fresh;

        key.ok_or_else(|| JwtError::UnknownKeyId(kid.to_string()))
    }
}

async fn fetch_jwks(client: &reqwest::Client, url: &str) -> Result<JwkSet, JwtError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| JwtError::JwksFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(JwtError::JwksFetch(format!("HTTP {}", response.status())));
    }

    response
        .json::<JwkSet>()
        .await
        .map_err(|e| JwtError::JwksFetch(e.to_string()))
}

#[cfg(test)]
mod tests;
