//! S3-based image upload URLs
mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use error::{BucketError, BucketResult};

/// Prefix of every uploaded image key
const IMAGE_KEY_PREFIX: &str = "images";

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for PUT operations
    pub url: String,
    /// Object key the upload will land under
    pub key: String,
    /// When the URL stops working
    pub expires_at: DateTime<Utc>,
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    presigned_url_expiry_secs: u64,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `presigned_url_expiry_secs` - Lifetime of generated upload URLs
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            presigned_url_expiry_secs,
        }
    }

    /// Object key for a new image: `images/<uuid v4>`
    #[must_use]
    pub fn new_image_key() -> String {
        format!("{IMAGE_KEY_PREFIX}/{}", Uuid::new_v4())
    }

    /// Generates a presigned URL for uploading a new image
    ///
    /// Signing happens locally; no request reaches S3.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    pub async fn generate_presigned_put_url(&self) -> BucketResult<PresignedUrl> {
        let key = Self::new_image_key();
        let expires_in = Duration::from_secs(self.presigned_url_expiry_secs);

        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .presigned(presigned_config)
            .await
            .map_err(|e| BucketError::S3Error(format!("Failed to generate presigned URL: {e}")))?;

        Ok(PresignedUrl {
            url: presigned_request.uri().to_string(),
            key,
            expires_at: Utc::now() + expires_in,
        })
    }
}
