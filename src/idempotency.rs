//! Request-deduplication guard.
//!
//! # Responsibilities
//! - Fingerprint mutating request bodies (SHA-256)
//! - Record `(endpoint, idempotency key)` → fingerprint in the backend
//! - Reject byte-identical repeats with `Duplicate`
//!
//! # Design Decisions
//! - Check-and-set runs under a lock sharded by the hash of
//!   `(endpoint, key)`, so unrelated mutating requests never serialize
//!   against each other while repeats of one key always do.
//! - Policy on key reuse with a different body is lenient: the record is
//!   overwritten and the request admitted. Only the exact triple
//!   `(endpoint, key, body)` is deduplicated.
//! - Records never expire.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::store::KvBackend;

/// Stored per `(endpoint, idempotency key)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// Hex SHA-256 of the request body.
    pub body_hash: String,
    /// Seconds since epoch at which the record was written.
    pub timestamp: u64,
}

/// Admission guard giving mutating endpoints an at-most-once-per-key
/// guarantee for byte-identical requests.
#[derive(Clone)]
pub struct IdempotencyGuard {
    backend: Arc<dyn KvBackend>,
    locks: Arc<Vec<Mutex<()>>>,
}

impl IdempotencyGuard {
    /// Create a guard over the given backend with `shards` lock shards.
    pub fn new(backend: Arc<dyn KvBackend>, shards: usize) -> Self {
        let shards = shards.max(1);
        let locks = (0..shards).map(|_| Mutex::new(())).collect();
        Self {
            backend,
            locks: Arc::new(locks),
        }
    }

    fn lock_for(&self, endpoint: &str, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        endpoint.hash(&mut hasher);
        key.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.locks.len();
        &self.locks[shard]
    }

    fn record_key(endpoint: &str, key: &str) -> String {
        format!("idempotency{}/{}", endpoint, key)
    }

    /// Admit or reject one mutating request.
    ///
    /// Looks up the record for `(endpoint, key)` and compares fingerprints:
    /// an equal hash is a repeat and fails [`ApiError::Duplicate`]; anything
    /// else (no record, or a different hash) writes the new record and
    /// admits the request. Lookup and write are one atomic section under
    /// the shard lock.
    pub async fn check_and_set(
        &self,
        endpoint: &str,
        key: &str,
        body_hash: &str,
    ) -> Result<(), ApiError> {
        let _guard = self.lock_for(endpoint, key).lock().await;

        let record_key = Self::record_key(endpoint, key);
        if let Some(data) = self.backend.get(&record_key).await? {
            let record: IdempotencyRecord = serde_json::from_slice(&data)?;
            if record.body_hash == body_hash {
                tracing::warn!(endpoint, idempotency_key = key, "duplicate request detected");
                return Err(ApiError::Duplicate);
            }
        }

        let record = IdempotencyRecord {
            body_hash: body_hash.to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        self.backend
            .put(&record_key, serde_json::to_vec(&record)?)
            .await
    }
}

/// Hex SHA-256 fingerprint of a request body.
pub fn hash_body(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
