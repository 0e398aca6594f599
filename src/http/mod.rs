//! HTTP surface of the registry.
//!
//! # Responsibilities
//! - Build the Axum router with all handlers
//! - Wire up middleware (rate limit, metrics, idempotency, tracing)
//! - Bind the server and serve until shutdown

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
