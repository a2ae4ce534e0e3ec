//! Custom extractors for request validation

use aide::operation::OperationInput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "binding_error",
                    "Missing Content-Type: application/json header",
                ),
                other => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "binding_error",
                    format!("Invalid JSON payload: {}", other.body_text()),
                ),
            })?;

        payload.validate().map_err(|errors| {
            let mut fields: Vec<_> = errors
                .field_errors()
                .into_iter()
                .map(|(field, field_errors)| {
                    field_errors
                        .first()
                        .and_then(|error| error.message.as_ref())
                        .map_or_else(|| format!("invalid {field}"), ToString::to_string)
                })
                .collect();
            fields.sort();

            AppError::validation(fields.join(", "))
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        Json::<T>::operation_input(ctx, operation);
    }
}
