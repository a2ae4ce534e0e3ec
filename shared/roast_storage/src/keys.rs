//! Key conventions for the single-table design.
//!
//! Pure functions for partition/sort keys and generated identifiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Partition key prefix for roasts and their reviews
pub const ROAST_PREFIX: &str = "ROAST#";
/// Sort key prefix for reviews
pub const REVIEW_PREFIX: &str = "REVIEW#";
/// Partition key prefix for users
pub const USER_PREFIX: &str = "USER#";
/// Sort key prefix shared by every profile item
pub const PROFILE_PREFIX: &str = "PROFILE";

/// Turns a display name into a stable identifier.
///
/// Trims surrounding whitespace, splits on spaces, uppercases the first character of
/// every segment and joins the segments without a separator.
/// `"cranberry greens powder shake"` becomes `"CranberryGreensPowderShake"`.
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    name.trim()
        .split(' ')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Pattern: `ROAST#<roast_id>`
#[must_use]
pub fn roast_pk(roast_id: &str) -> String {
    format!("{ROAST_PREFIX}{roast_id}")
}

/// Pattern: `PROFILE#<YYYYMMDD>`
#[must_use]
pub fn roast_sk(created_at: DateTime<Utc>) -> String {
    format!("{PROFILE_PREFIX}#{}", profile_date(created_at))
}

/// Pattern: `REVIEW#<review_id>`
#[must_use]
pub fn review_sk(review_id: &str) -> String {
    format!("{REVIEW_PREFIX}{review_id}")
}

/// Pattern: `USER#<user_id>`
#[must_use]
pub fn user_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Pattern: `PROFILE#<user_id>`
#[must_use]
pub fn user_sk(user_id: &str) -> String {
    format!("{PROFILE_PREFIX}#{user_id}")
}

/// Pattern: `YYYYMMDD`
#[must_use]
pub fn profile_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

/// Generates a review identifier: `<epoch millis>#<8 hex chars>`.
///
/// The millisecond timestamp is zero-padded to 13 digits so identifiers sort by
/// creation time; the random suffix keeps reviews created in the same millisecond apart.
#[must_use]
pub fn generate_review_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{:013}#{}", now.timestamp_millis(), &suffix[..8])
}
