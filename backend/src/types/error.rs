//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roast_storage::{ratings::RatingError, store::StoreError, user::UserStorageError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::BucketError;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            inner: ErrorResponse {
                error: message.into(),
                code,
            },
        }
    }

    /// 400 for a request that failed validation
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// 404 with a resource-specific code
    #[must_use]
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// 500 without leaking internals
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Storage error: {err}");
        Self::internal()
    }
}

impl From<UserStorageError> for AppError {
    fn from(err: UserStorageError) -> Self {
        match err {
            UserStorageError::NotFound(_) => Self::not_found("user_not_found", "User not found"),
            UserStorageError::SavedRoastNotFound(roast_id) => Self::not_found(
                "roast_not_saved",
                format!("Roast {roast_id} is not in the saved list"),
            ),
            UserStorageError::Store(err) => err.into(),
        }
    }
}

impl From<RatingError> for AppError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::RoastNotFound(_) => Self::not_found("roast_not_found", "Roast not found"),
            RatingError::Conflict(roast_key) => {
                tracing::error!("Gave up updating ratings of {roast_key} after repeated conflicts");
                Self::internal()
            }
            RatingError::Store(err) => err.into(),
        }
    }
}

impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        tracing::error!("S3 error: {err}");
        Self::internal()
    }
}

impl OperationOutput for AppError {
    type Inner = ErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ErrorResponse>::operation_response(ctx, operation)
    }
}
