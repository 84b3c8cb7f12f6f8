//! Cache storage: the persistence contract and the in-memory reference
//! backend.
//!
//! Storage sees opaque bytes only. Everything HTTP-shaped — what a key
//! means, what the blob contains — is decided above it, so any key/value
//! backend (disk, redis, sqlite) can implement [`Storage`] without
//! knowing it is holding HTTP responses.

use async_trait::async_trait;
use bytes::Bytes;

use crate::BoxError;

pub mod memory;

pub use memory::Memstore;

/// A cache storage backend.
///
/// Keys are 64-bit values derived from the request; values are encoded
/// cache entries, owned by the backend once written. Implementations
/// must be safe for concurrent use and atomic per key: a `load` racing a
/// `store` on the same key observes either the old value or the new one,
/// never a torn mix.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persists a value under the given key, replacing any previous value.
    async fn store(&self, key: u64, value: Bytes) -> Result<(), BoxError>;

    /// Loads the value stored under the given key.
    ///
    /// Absence is `Ok(None)`, not an error; errors are reserved for
    /// backend failures (I/O, connectivity).
    async fn load(&self, key: u64) -> Result<Option<Bytes>, BoxError>;
}
