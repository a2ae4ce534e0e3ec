//! Roasts API service

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Firebase ID token verification
pub mod jwt;

/// Presigned image uploads
pub mod media_storage;

/// Request guards and tracing
pub mod middleware;

/// HTTP handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Application state
pub mod state;

/// Configuration, errors and extractors
pub mod types;
