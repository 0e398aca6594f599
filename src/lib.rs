//! Versioned configuration registry.
//!
//! An HTTP service managing named, versioned configuration entries
//! (`Config`) and ordered collections of them (`ConfigGroup`), persisted
//! in a pluggable key-value store. Mutating endpoints carry an
//! at-most-once-per-key guarantee via the idempotency guard; group
//! members can be queried and bulk-deleted by exact label-set match.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod idempotency;
pub mod labels;
pub mod model;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use http::HttpServer;
