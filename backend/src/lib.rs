//! Object storage gateway service
//!
//! Exposes bucket and object operations of an S3-compatible provider over REST.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::missing_errors_doc)]

/// HTTP routes
pub mod routes;

/// Server startup
pub mod server;

/// Shared types: environment configuration and API errors
pub mod types;
