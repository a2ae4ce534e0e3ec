use std::{sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use axum::{http::StatusCode, Extension, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::{
    jwt::FirebaseVerifier,
    middleware::{http_trace_layer, ApiKey, CORRELATION_ID_HEADER},
    routes,
    state::AppState,
    types::Environment,
};

/// Requests running longer than this are answered with 408
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the full application router with its dependencies and middleware
pub fn router(
    environment: Environment,
    state: AppState,
    firebase: Arc<FirebaseVerifier>,
    api_key: ApiKey,
) -> Router {
    let mut openapi = OpenApi::default();
    openapi.info.title = "Roasts API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

    routes::handler(&environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(state.roasts))
        .layer(Extension(state.reviews))
        .layer(Extension(state.users))
        .layer(Extension(state.ratings))
        .layer(Extension(state.media_storage))
        .layer(Extension(firebase))
        .layer(Extension(api_key))
        .layer(
            ServiceBuilder::new()
                // Keep an incoming correlation ID, otherwise mint one
                .layer(SetRequestIdLayer::new(
                    CORRELATION_ID_HEADER,
                    MakeRequestUuid,
                ))
                .layer(http_trace_layer())
                .layer(PropagateRequestIdLayer::new(CORRELATION_ID_HEADER)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    state: AppState,
    firebase: Arc<FirebaseVerifier>,
    api_key: ApiKey,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.web_port()));
    let router = router(environment, state, firebase, api_key);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🍖 Roasts API started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
