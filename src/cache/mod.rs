//! The cache orchestrator: ties a strategy, a storage backend, and a
//! transport into one caching HTTP client.
//!
//! The request lifecycle:
//!
//! 1. Ask the strategy whether the request may use the cache at all; if
//!    not, go straight to the transport.
//! 2. Derive the cache key and load the candidate entry from storage.
//! 3. If an entry decodes, ask the strategy for its freshness; a fresh
//!    entry is served without touching the network.
//! 4. Otherwise fetch live, then ask the strategy whether the response
//!    may be stored, and persist it under the same key if so.
//!
//! Storage failures never fail a request — they are logged and the cache
//! degrades to a passthrough.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{Client, ClientError, Http1Client};
use crate::http::{Request, Response};
use crate::storage::{Memstore, Storage};
use crate::strategy::{Freshness, Rfc7234, Strategy};

pub mod entry;
mod key;
pub mod stats;

pub use entry::{Entry, EntryError};
pub use stats::CacheStats;

use key::request_key;

/// An HTTP client that caches responses.
///
/// Cheap to clone: clones share the same strategy, storage, transport,
/// and counters, so one cache can serve many tasks.
///
/// # Examples
///
/// ```no_run
/// use cachet::{HttpCache, Request};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = HttpCache::new();
///
///     let request = Request::get("http://example.com/")?;
///     let first = cache.execute(request.clone()).await?; // network
///     let second = cache.execute(request).await?; // cache, if storable
///
///     assert_eq!(first.status(), second.status());
///     println!("hit rate: {:.2}", cache.stats().hit_rate());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct HttpCache {
    strategy: Arc<dyn Strategy>,
    storage: Arc<dyn Storage>,
    client: Arc<dyn Client>,
    stats: Arc<CacheStats>,
}

impl HttpCache {
    /// Creates a cache with the default stack: [`Rfc7234`] strategy,
    /// [`Memstore`] storage, [`Http1Client`] transport.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a cache.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the cache's running counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Executes a request, serving it from the cache when the configured
    /// strategy allows and hitting the transport otherwise.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`ClientError`] when a live fetch is
    /// needed and fails. Storage and decode failures are not errors:
    /// they degrade to a live fetch.
    pub async fn execute(&self, req: Request) -> Result<Response, ClientError> {
        if !self.strategy.cache(&req) {
            debug!(method = %req.method(), url = %req.url(), "bypassing cache");
            return self.client.execute(&req).await;
        }

        let key = request_key(&req);

        if let Some(entry) = self.lookup(key, &req).await {
            self.stats.record_hit();
            debug!(key, url = %req.url(), "serving from cache");
            return Ok(entry.into_response());
        }
        self.stats.record_miss();

        let response = self.client.execute(&req).await?;

        if self.strategy.store(&req, &response) {
            let blob = Entry::encode(&req, &response);
            match self.storage.store(key, blob).await {
                Ok(()) => {
                    self.stats.record_store();
                    debug!(key, url = %req.url(), "response stored");
                }
                Err(error) => {
                    warn!(key, error = %error, "failed to store response");
                }
            }
        }

        Ok(response)
    }

    /// Loads, decodes, and freshness-checks the candidate entry for `key`.
    ///
    /// Every failure mode reads as a miss: absent entries, storage
    /// errors, corrupt blobs, and entries the strategy judges unusable.
    async fn lookup(&self, key: u64, req: &Request) -> Option<Entry> {
        let blob = match self.storage.load(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, error = %error, "storage load failed");
                return None;
            }
        };

        let entry = match Entry::decode(blob) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(key, error = %error, "stored entry is corrupt");
                return None;
            }
        };

        match self.strategy.fresh(req, &entry) {
            Freshness::Fresh => Some(entry),
            verdict => {
                debug!(key, %verdict, "cached response unusable");
                None
            }
        }
    }
}

impl Default for HttpCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures and builds an [`HttpCache`].
///
/// Every component has a default, so `build` cannot fail; setting the
/// same component twice keeps the later value.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cachet::strategy::Aggressive;
/// use cachet::HttpCache;
///
/// let cache = HttpCache::builder()
///     .strategy(Aggressive::new(Duration::from_secs(600)))
///     .build();
/// ```
#[derive(Default)]
pub struct Builder {
    strategy: Option<Arc<dyn Strategy>>,
    storage: Option<Arc<dyn Storage>>,
    client: Option<Arc<dyn Client>>,
}

impl Builder {
    /// Sets the cache strategy. Defaults to [`Rfc7234`].
    #[must_use]
    pub fn strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    /// Sets the storage backend. Defaults to [`Memstore`].
    #[must_use]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Sets the transport. Defaults to [`Http1Client`].
    #[must_use]
    pub fn client(mut self, client: impl Client + 'static) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Builds the cache.
    pub fn build(self) -> HttpCache {
        HttpCache {
            strategy: self.strategy.unwrap_or_else(|| Arc::new(Rfc7234)),
            storage: self.storage.unwrap_or_else(|| Arc::new(Memstore::new())),
            client: self.client.unwrap_or_else(|| Arc::new(Http1Client::new())),
            stats: Arc::new(CacheStats::default()),
        }
    }
}
