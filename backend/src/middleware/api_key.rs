use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension,
};

use crate::types::AppError;

/// Header carrying the admin API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Configured admin API key; `None` rejects every admin request
#[derive(Debug, Clone, Default)]
pub struct ApiKey(pub Option<String>);

/// Guards admin routes with a shared API key
///
/// # Errors
///
/// - `AppError` - 401 when the header is missing or does not match
pub async fn api_key_middleware(
    Extension(api_key): Extension<ApiKey>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|header| header.to_str().ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AppError::new(StatusCode::UNAUTHORIZED, "missing_api_key", "API key is missing")
        })?;

    match api_key.0.as_deref() {
        Some(expected) if expected == provided => Ok(next.run(request).await),
        _ => Err(AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_api_key",
            "Invalid API key",
        )),
    }
}
