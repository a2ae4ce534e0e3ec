//! Error types for rating aggregation

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for rating aggregation
pub type RatingResult<T> = Result<T, RatingError>;

/// Rating aggregation errors
#[derive(Debug, Error)]
pub enum RatingError {
    /// The roast being rated does not exist
    #[error("Roast {0} not found")]
    RoastNotFound(String),

    /// The aggregate kept changing underneath us until retries ran out
    #[error("Concurrent updates to roast {0}, retries exhausted")]
    Conflict(String),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
