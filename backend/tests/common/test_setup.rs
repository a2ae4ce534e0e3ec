use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    jwt::FirebaseVerifier, media_storage::MediaStorage, middleware::ApiKey, server,
    state::AppState, types::Environment,
};
use jsonwebtoken::jwk::JwkSet;
use roast_storage::store::{InMemoryStore, TableStore};
use tower::ServiceExt;

/// Firebase project the test tokens are issued for
pub const PROJECT_ID: &str = "roasts-test";

/// Key ID of the fixture signing key
pub const TEST_KID: &str = "test-kid";

/// Admin API key accepted by the test router
pub const TEST_API_KEY: &str = "test-key";

/// Public half of `tests/fixtures/firebase_test_key.pem`
const TEST_KEY_MODULUS: &str = "yjSUiJlbTgLDYrJTPS5hPLz0eJnmbTciYOMxtAmVdBY969cL6DkYvN5O6BzHRNrNQE5dgJG1L14ZsKk-ogej6gY4ieW3Q5blKCqphoGRHU6lecv7-rR6A8ZJ_4sEmT4mHM0NXocV3cH0J0vkrAaqDVX93G6K1VG3SROiWJcNBZpvsKOPLr3NtSPe3P_4nD__Mk66ZIpQ7aCGy1xocPrsQR3s2IYpez1yPeWJjEI3bgdxyYaHrtu3Y8Km4wn4Z_UX5_VENj08zpBHvmF6XnV_yfuk-mhCrd6HLnYvJIppr2nrvEeGJQq6v0m0vDpHwtWgw-nZq3w8iEg62nvExMlA5Q";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

pub fn test_jwk_set() -> JwkSet {
    serde_json::from_value(serde_json::json!({
        "keys": [{
            "kty": "RSA",
            "kid": TEST_KID,
            "alg": "RS256",
            "use": "sig",
            "n": TEST_KEY_MODULUS,
            "e": "AQAB"
        }]
    }))
    .expect("Invalid test JWK set")
}

/// S3 client with fixed credentials; presigning never leaves the process
fn test_s3_client() -> Arc<S3Client> {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("eu-west-2"))
        .credentials_provider(Credentials::from_keys("test", "test", None))
        .build();

    Arc::new(S3Client::from_conf(config))
}

/// Full application router over an in-memory table
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestSetup {
    /// Router with Firebase verification disabled: the bearer token is the user ID
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::build(store.clone(), store, true)
    }

    /// Router that verifies bearer tokens against the fixture key
    pub fn with_auth() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::build(store.clone(), store, false)
    }

    /// Router over a custom table store; `store` still exposes the wrapped in-memory table
    pub fn with_store(table: Arc<dyn TableStore>, store: Arc<InMemoryStore>) -> Self {
        Self::build(table, store, true)
    }

    fn build(table: Arc<dyn TableStore>, store: Arc<InMemoryStore>, disable_auth: bool) -> Self {
        setup_test_env();

        let environment = Environment::Local {
            disable_auth,
            presign_expiry_override: Some(300),
        };

        let media_storage = Arc::new(MediaStorage::new(
            test_s3_client(),
            "roasts-images-test".to_string(),
            environment.presigned_url_expiry_secs(),
        ));

        let firebase = Arc::new(FirebaseVerifier::with_jwks(
            PROJECT_ID.to_string(),
            &test_jwk_set(),
        ));

        let state = AppState::new(table, media_storage);
        let router = server::router(
            environment,
            state,
            firebase,
            ApiKey(Some(TEST_API_KEY.to_string())),
        );

        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn send_get_request(&self, route: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        token: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }

    pub async fn send_admin_request(
        &self,
        route: &str,
        api_key: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(api_key) = api_key {
            builder = builder.header("X-API-Key", api_key);
        }

        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }

    pub async fn parse_response_body(response: Response) -> serde_json::Value {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).expect("Response body is not JSON")
    }

    /// Creates a roast through the admin API and returns its ID
    pub async fn create_roast(&self, name: &str) -> String {
        let response = self
            .send_admin_request(
                "/roast",
                Some(TEST_API_KEY),
                serde_json::json!({
                    "name": name,
                    "imageURL": "https://example.com/roast.jpg",
                    "priceRange": 2,
                    "location": "London",
                }),
            )
            .await;
        assert_eq!(response.status(), http::StatusCode::OK);

        let body = Self::parse_response_body(response).await;
        body["roastID"].as_str().unwrap().to_string()
    }

    /// Posts a review with every category rated `rating`
    pub async fn post_review(&self, user_id: &str, roast_id: &str, rating: u8) -> Response {
        self.send_post_request(
            "/review",
            Some(user_id),
            review_payload(user_id, roast_id, rating),
        )
        .await
    }
}

pub fn review_payload(user_id: &str, roast_id: &str, rating: u8) -> serde_json::Value {
    serde_json::json!({
        "roastID": roast_id,
        "userID": user_id,
        "overallRating": rating,
        "meatRating": rating,
        "potatoesRating": rating,
        "vegRating": rating,
        "gravyRating": rating,
        "comment": "Proper gravy",
        "displayName": "Sam",
    })
}
