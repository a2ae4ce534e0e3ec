pub mod api_key;
pub mod auth;
pub mod correlation_id;

pub use api_key::{api_key_middleware, ApiKey};
pub use auth::{auth_middleware, AuthenticatedUser};
pub use correlation_id::{http_trace_layer, CORRELATION_ID_HEADER};
