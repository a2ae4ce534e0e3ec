use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{media_storage::MediaStorage, middleware::AuthenticatedUser, types::AppError};

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewImageResponse {
    /// Presigned PUT URL
    pub url: String,
    /// Object key the image will be stored under
    pub key: String,
    /// When the upload URL stops working, as an RFC 3339 UTC timestamp
    pub expires_at: String,
}

/// Issues a presigned URL for uploading one image
#[instrument(skip(media_storage, user), fields(user_id = %user.user_id))]
pub async fn new_image(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    user: AuthenticatedUser,
) -> Result<Json<NewImageResponse>, AppError> {
    let presigned_url = media_storage.generate_presigned_put_url().await?;

    info!("Issued upload URL for {}", presigned_url.key);
    Ok(Json(NewImageResponse {
        url: presigned_url.url,
        key: presigned_url.key,
        expires_at: presigned_url.expires_at.to_rfc3339(),
    }))
}
