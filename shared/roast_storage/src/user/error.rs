//! Error types for user storage operations

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for user storage operations
pub type UserStorageResult<T> = Result<T, UserStorageError>;

/// User storage errors
#[derive(Debug, Error)]
pub enum UserStorageError {
    /// No profile exists for the user
    #[error("User {0} not found")]
    NotFound(String),

    /// The roast is not in the user's saved list
    #[error("Roast {0} is not saved")]
    SavedRoastNotFound(String),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_dynamo::Error> for UserStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::Store(err.into())
    }
}
