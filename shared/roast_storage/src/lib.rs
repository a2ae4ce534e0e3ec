//! Storage for the Roasts API
//!
//! All entities live in a single `DynamoDB` table addressed by `PK` + `SK`. This crate
//! provides the table-store seam, the key conventions, one repository per entity and
//! the rating aggregation that keeps a roast's running averages current.

pub mod keys;
pub mod ratings;
pub mod review;
pub mod roast;
pub mod store;
pub mod user;
