//! Entity types stored by the registry.
//!
//! # Responsibilities
//! - Define the `Config` and `ConfigGroup` wire/storage shapes
//! - Presence validation for create operations
//!
//! # Design Decisions
//! - Identity is `(name, version)` for both entity kinds
//! - Entities are value types; a group embeds full copies of its members

pub mod config;
pub mod group;

pub use config::Config;
pub use group::ConfigGroup;
