//! Environment configuration for different deployment stages

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

/// Default presigned URL expiry (15 minutes)
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 15 * 60;

/// Default HTTP port
const DEFAULT_WEB_PORT: u16 = 8000;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Local environment (optionally against `LocalStack` / `DynamoDB` Local)
    Local {
        /// Skip Firebase verification and treat the bearer token as the user ID
        disable_auth: bool,
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

/// Loads the dotenv file named by `ENV_FILE` (default `.env`) when running locally
///
/// Returns the path that was loaded, if any. Variables already set in the process win.
#[must_use]
pub fn load_env_file() -> Option<PathBuf> {
    let is_local = env::var("ENV").map_or(true, |env| env.trim().eq_ignore_ascii_case("local"));
    if !is_local {
        return None;
    }

    let file = env::var("ENV_FILE").unwrap_or_else(|_| ".env".to_string());
    dotenvy::from_filename(file).ok()
}

impl Environment {
    /// Creates an Environment from the `ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("ENV")
            .unwrap_or_else(|_| "local".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "dev" => Self::Staging,
            "local" => {
                let disable_auth = env::var("DISABLE_AUTH")
                    .is_ok_and(|val| val.trim().eq_ignore_ascii_case("true"));

                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Local {
                    disable_auth,
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the `DynamoDB` table name
    ///
    /// # Panics
    ///
    /// Panics if `TABLE_NAME` is not set outside the local environment
    #[must_use]
    pub fn table_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("TABLE_NAME").expect("TABLE_NAME environment variable is not set")
            }
            Self::Local { .. } => env::var("TABLE_NAME").unwrap_or_else(|_| "roasts".to_string()),
        }
    }

    /// Returns the S3 bucket receiving image uploads
    ///
    /// # Panics
    ///
    /// Panics if `IMAGE_BUCKET` is not set outside the local environment
    #[must_use]
    pub fn image_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("IMAGE_BUCKET").expect("IMAGE_BUCKET environment variable is not set")
            }
            Self::Local { .. } => {
                env::var("IMAGE_BUCKET").unwrap_or_else(|_| "roasts-images".to_string())
            }
        }
    }

    /// Port the HTTP server listens on
    #[must_use]
    pub fn web_port(&self) -> u16 {
        env::var("WEB_PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(DEFAULT_WEB_PORT)
    }

    /// Shared secret for admin routes; `None` rejects every admin request
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        env::var("API_KEY").ok().filter(|key| !key.is_empty())
    }

    /// Firebase project whose ID tokens are accepted
    ///
    /// # Panics
    ///
    /// Panics if `FIREBASE_PROJECT_ID` is not set while auth is enabled
    #[must_use]
    pub fn firebase_project_id(&self) -> String {
        if self.disable_auth() {
            return env::var("FIREBASE_PROJECT_ID").unwrap_or_else(|_| "roasts-local".to_string());
        }

        env::var("FIREBASE_PROJECT_ID").expect("FIREBASE_PROJECT_ID environment variable is not set")
    }

    /// Whether Firebase token verification is skipped
    #[must_use]
    pub const fn disable_auth(&self) -> bool {
        matches!(
            self,
            Self::Local {
                disable_auth: true,
                ..
            }
        )
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Local { .. } | Self::Staging)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn log_json(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Whether the table is created on startup when missing
    #[must_use]
    pub const fn ensure_table(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<String> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Local { .. } => env::var("AWS_ENDPOINT_URL_OVERRIDE")
                .ok()
                .filter(|url| !url.is_empty()),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only serves path-style bucket addressing
        if self.override_aws_endpoint_url().is_some() {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// AWS `DynamoDB` service configuration
    pub async fn dynamodb_client_config(&self) -> aws_sdk_dynamodb::Config {
        let aws_config = self.aws_config().await;
        (&aws_config).into()
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            Self::Local {
                presign_expiry_override,
                ..
            } => presign_expiry_override.unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }
}
