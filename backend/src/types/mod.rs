mod environment;
mod error;
pub mod extractors;
mod validation;

pub use environment::{load_env_file, Environment};
pub use error::{AppError, ErrorResponse};
pub use extractors::ValidatedJson;
pub use validation::{roast_id_from_path, validate_roast_id};
