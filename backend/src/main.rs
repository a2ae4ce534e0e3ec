use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use backend::{
    jwt::FirebaseVerifier,
    media_storage::MediaStorage,
    middleware::ApiKey,
    server,
    state::AppState,
    types::{load_env_file, Environment},
};
use roast_storage::store::{DynamoDbStore, TableStore};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = load_env_file();
    let environment = Environment::from_env();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON for staging/production log ingestion, readable text locally
    if environment.log_json() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    if let Some(path) = env_file {
        tracing::info!("Loaded environment from {}", path.display());
    }
    tracing::info!("Starting in {environment:?} environment");

    let dynamodb_client = Arc::new(DynamoDbClient::from_conf(
        environment.dynamodb_client_config().await,
    ));
    let table = DynamoDbStore::new(dynamodb_client, environment.table_name());
    if environment.ensure_table() {
        table.ensure_table().await?;
    }
    let store: Arc<dyn TableStore> = Arc::new(table);

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.image_bucket(),
        environment.presigned_url_expiry_secs(),
    ));

    let firebase = Arc::new(FirebaseVerifier::new(environment.firebase_project_id())?);
    let api_key = ApiKey(environment.api_key());
    if api_key.0.is_none() {
        tracing::warn!("API_KEY is not set, admin routes will reject every request");
    }

    let state = AppState::new(store, media_storage);

    server::start(environment, state, firebase, api_key).await
}
