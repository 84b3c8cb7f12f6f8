//! The in-memory storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::BoxError;

use super::Storage;

/// An in-memory [`Storage`] backed by a concurrent hash map.
///
/// Entries live until overwritten or the store is dropped; there is no
/// eviction. Suited to processes whose set of cached responses is
/// bounded, such as a crawl over a known host list.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use cachet::storage::{Memstore, Storage};
///
/// # async fn demo() -> Result<(), cachet::BoxError> {
/// let store = Memstore::new();
/// store.store(7, Bytes::from_static(b"payload")).await?;
/// assert_eq!(store.load(7).await?.unwrap().as_ref(), b"payload");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Memstore {
    entries: DashMap<u64, Bytes>,
}

impl Memstore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Storage for Memstore {
    async fn store(&self, key: u64, value: Bytes) -> Result<(), BoxError> {
        self.entries.insert(key, value);
        Ok(())
    }

    async fn load(&self, key: u64) -> Result<Option<Bytes>, BoxError> {
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn store_then_load() {
        let store = Memstore::new();
        store.store(1, Bytes::from_static(b"hello")).await.unwrap();
        let loaded = store.load(1).await.unwrap();
        assert_eq!(loaded.unwrap().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn absent_key_is_none_not_error() {
        let store = Memstore::new();
        assert!(store.load(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_loads_are_idempotent() {
        let store = Memstore::new();
        store.store(1, Bytes::from_static(b"stable")).await.unwrap();
        let first = store.load(1).await.unwrap();
        let second = store.load(1).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn store_replaces_previous_value() {
        let store = Memstore::new();
        store.store(1, Bytes::from_static(b"old")).await.unwrap();
        store.store(1, Bytes::from_static(b"new")).await.unwrap();
        assert_eq!(store.load(1).await.unwrap().unwrap().as_ref(), b"new");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_land_on_distinct_keys() {
        let store = Arc::new(Memstore::new());
        let mut handles = Vec::new();

        for key in 0..32u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let value = Bytes::from(key.to_be_bytes().to_vec());
                store.store(key, value).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 32);
        for key in 0..32u64 {
            let loaded = store.load(key).await.unwrap().unwrap();
            assert_eq!(loaded.as_ref(), key.to_be_bytes());
        }
    }
}
