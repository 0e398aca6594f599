//! In-memory key-value backend.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ApiError;
use crate::store::KvBackend;

/// A concurrent in-memory backend over `DashMap`.
///
/// Entry-level locking in `DashMap` makes every single-key operation
/// atomic, which is what the [`KvBackend`] contract requires.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored entries. Test helper.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ApiError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, ApiError> {
        // The entry API holds the shard lock across check and insert.
        match self.inner.entry(key.to_string()) {
            dashmap::Entry::Occupied(_) => Ok(false),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ApiError> {
        Ok(self.inner.get(key).map(|v| v.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, ApiError> {
        Ok(self.inner.remove(key).is_some())
    }

    async fn delete_tree(&self, key: &str) -> Result<usize, ApiError> {
        let subtree = format!("{}/", key);
        let doomed: Vec<String> = self
            .inner
            .iter()
            .filter(|e| e.key() == key || e.key().starts_with(&subtree))
            .map(|e| e.key().clone())
            .collect();
        let mut removed = 0;
        for k in doomed {
            if self.inner.remove(&k).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new();
        backend.put("a", b"1".to_vec()).await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert!(backend.delete("a").await.unwrap());
        assert!(!backend.delete("a").await.unwrap());
        assert_eq!(backend.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_if_absent() {
        let backend = MemoryBackend::new();
        assert!(backend.put_if_absent("a", b"1".to_vec()).await.unwrap());
        assert!(!backend.put_if_absent("a", b"2".to_vec()).await.unwrap());
        assert_eq!(backend.get("a").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_tree_matches_whole_segments() {
        let backend = MemoryBackend::new();
        backend.put("g/1", b"x".to_vec()).await.unwrap();
        backend.put("g/1/sub", b"x".to_vec()).await.unwrap();
        backend.put("g/12", b"x".to_vec()).await.unwrap();

        assert_eq!(backend.delete_tree("g/1").await.unwrap(), 2);
        assert_eq!(backend.get("g/12").await.unwrap(), Some(b"x".to_vec()));
    }
}
