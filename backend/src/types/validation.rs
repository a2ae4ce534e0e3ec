//! Shared field validators

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use super::AppError;

/// Roast IDs are PascalCase slugs: no whitespace and no key separator
static ROAST_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s#]+$").expect("Invalid regex"));

/// Validator hook for roast ID fields in request bodies
///
/// # Errors
///
/// Returns `invalid_roast_id` when the ID is empty or contains whitespace or `#`
pub fn validate_roast_id(roast_id: &str) -> Result<(), ValidationError> {
    if ROAST_ID_REGEX.is_match(roast_id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_roast_id").with_message("invalid roastID".into()))
    }
}

/// Checks a roast ID taken from a path segment
///
/// # Errors
///
/// Returns a 400 `AppError` when the ID is malformed
pub fn roast_id_from_path(roast_id: &str) -> Result<&str, AppError> {
    validate_roast_id(roast_id)
        .map(|()| roast_id)
        .map_err(|_| AppError::validation("invalid roastID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_roast_id() {
        for valid in ["SundayCarvery", "Pie&Mash", "Roast-2"] {
            assert!(validate_roast_id(valid).is_ok(), "{valid}");
        }

        for invalid in ["", "Sunday Carvery", "ROAST#SundayCarvery", "Tab\tbed"] {
            assert!(validate_roast_id(invalid).is_err(), "{invalid:?}");
        }
    }

    #[test]
    fn test_roast_id_from_path() {
        assert_eq!(roast_id_from_path("SundayCarvery").unwrap(), "SundayCarvery");
        assert!(roast_id_from_path("Sunday Carvery").is_err());
    }
}
