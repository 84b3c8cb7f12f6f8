//! # cachet
//!
//! An RFC 7234 caching layer for HTTP clients, built from scratch on
//! Tokio. `cachet` sits between your code and the network, deciding per
//! request whether a stored response may be served, whether a live
//! response may be kept, and when a stored response has gone stale.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cachet::{HttpCache, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = HttpCache::new();
//!
//!     let request = Request::get("http://example.com/")?;
//!     let response = cache.execute(request.clone()).await?; // fetched
//!     let cached = cache.execute(request).await?; // served from memory
//!
//!     println!("{} ({} bytes)", cached.status(), cached.body().len());
//!     println!("hit rate: {:.2}", cache.stats().hit_rate());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Three pluggable seams compose into an [`HttpCache`]:
//!
//! - [`strategy`] — the policy: may this request use the cache, may this
//!   response be stored, is this entry still fresh. [`Rfc7234`] follows
//!   the standard; [`Aggressive`] trades correctness for hit rate.
//! - [`storage`] — where encoded entries live, keyed by `u64`.
//!   [`Memstore`] is the in-memory reference backend.
//! - [`client`] — the transport behind the cache. [`Http1Client`] speaks
//!   plain HTTP/1.1 over TCP; bring your own [`Client`] for TLS or
//!   connection pooling.
//!
//! Swap any of them through [`HttpCache::builder`]:
//!
//! ```
//! use std::time::Duration;
//!
//! use cachet::{Aggressive, HttpCache};
//!
//! let cache = HttpCache::builder()
//!     .strategy(Aggressive::new(Duration::from_secs(600)))
//!     .build();
//! ```

pub mod cache;
pub mod client;
pub mod http;
pub mod storage;
pub mod strategy;

pub use cache::{Builder, CacheStats, Entry, EntryError, HttpCache};
pub use client::{Client, ClientError, Http1Client};
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use storage::{Memstore, Storage};
pub use strategy::{Aggressive, Freshness, Rfc7234, Strategy};

/// A type-erased error, used where backends surface their own failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
