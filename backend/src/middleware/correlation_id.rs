use axum::{body::Body, http::HeaderName};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};

/// Header carrying the per-request correlation ID
pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Tower trace layer opening one span per request, tagged with its correlation ID
///
/// Must sit inside the layer that assigns the ID so the header is already present.
pub fn http_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&axum::http::Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<Body>| {
        let correlation_id = request
            .headers()
            .get(&CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "request",
            %correlation_id,
            method = %request.method(),
            path = %request.uri().path(),
            user_id = tracing::field::Empty,
        )
    })
}
