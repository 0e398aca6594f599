//! Persistence for registry entities.
//!
//! # Responsibilities
//! - Define the injected key-value backend contract
//! - Provide the typed entity store used by the handlers
//!
//! # Data Flow
//! ```text
//! handlers ──▶ EntityStore (typed ops, group locks) ──▶ KvBackend (bytes)
//! ```
//!
//! # Design Decisions
//! - The backend offers linearizable single-key operations only; there is
//!   no multi-key atomicity. Uniqueness on create relies on the backend's
//!   atomic put-if-absent.
//! - Group read-modify-write sequences are serialized per group key by the
//!   entity store, not the backend.

pub mod entity;
pub mod memory;

use async_trait::async_trait;

use crate::error::ApiError;

pub use entity::EntityStore;
pub use memory::MemoryBackend;

/// An external key-value store with linearizable single-key operations.
///
/// The production deployment injects a client for the real store; tests
/// and the default binary use [`MemoryBackend`].
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Store `value` under `key`, overwriting any existing value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ApiError>;

    /// Store `value` under `key` only if the key is absent.
    ///
    /// Returns `true` if the value was written, `false` if the key was
    /// already present. The check and the write are a single atomic step.
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, ApiError>;

    /// Fetch the value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ApiError>;

    /// Remove the value under `key`. Returns `true` if a value existed.
    async fn delete(&self, key: &str) -> Result<bool, ApiError>;

    /// Remove `key` and every key nested under `key/`.
    ///
    /// Returns the number of entries removed. `key/` nesting is matched on
    /// whole path segments, so deleting `configgroup/g/1` leaves
    /// `configgroup/g/12` alone.
    async fn delete_tree(&self, key: &str) -> Result<usize, ApiError>;
}
