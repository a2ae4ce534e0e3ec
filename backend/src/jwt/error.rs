//! JWT-related error types

use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Errors that can occur while verifying a Firebase ID token
#[derive(Error, Debug)]
pub enum JwtError {
    /// The token header could not be decoded
    #[error("Malformed token: {0}")]
    Malformed(jsonwebtoken::errors::Error),

    /// Firebase only signs ID tokens with RS256
    #[error("Unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    /// The token header carries no `kid`
    #[error("Token header has no key ID")]
    MissingKeyId,

    /// No published key matches the token's `kid`
    #[error("Unknown signing key {0}")]
    UnknownKeyId(String),

    /// Signature, expiry, audience or issuer check failed
    #[error("Invalid or expired token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    /// The token names no user
    #[error("Token has an empty subject")]
    MissingSubject,

    /// Google's key set could not be fetched
    #[error("Failed to fetch signing keys: {0}")]
    JwksFetch(String),
}
