//! Cache strategies: the policy layer deciding what enters and leaves
//! the cache.
//!
//! A [`Strategy`] answers three questions for the orchestrator — may this
//! request use the cache, may this response be stored, is this stored
//! entry still usable — and nothing else. Two implementations ship:
//!
//! - [`Rfc7234`] follows the standard cache-control rules.
//! - [`Aggressive`] caches everything cacheable for a fixed lifetime,
//!   ignoring cache-control directives.

use std::fmt;

use crate::cache::Entry;
use crate::http::{Request, Response, StatusCode};

pub mod aggressive;
pub mod rfc7234;

pub use aggressive::Aggressive;
pub use rfc7234::Rfc7234;

/// The usability verdict on a stored response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The stored response may be served without contacting the origin.
    Fresh,
    /// The stored response is known but expired; with no revalidation
    /// round-trip in this cache, it must be refetched.
    Stale,
    /// The cache must be bypassed for this request, e.g. because the
    /// selecting headers no longer match what was stored.
    Transparent,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Freshness::Fresh => "fresh",
            Freshness::Stale => "stale",
            Freshness::Transparent => "transparent",
        };
        f.write_str(s)
    }
}

/// A cache policy.
///
/// Implementations must be stateless or internally synchronized: one
/// strategy instance serves every request passing through the cache.
pub trait Strategy: Send + Sync {
    /// Returns `true` if the request is eligible for caching.
    ///
    /// Called before any storage lookup; `false` bypasses the cache
    /// entirely for this request — no lookup, no store.
    fn cache(&self, req: &Request) -> bool;

    /// Returns `true` if the response to `req` may be persisted.
    ///
    /// Called after a live response returns and before it is stored.
    fn store(&self, req: &Request, resp: &Response) -> bool;

    /// Judges a stored entry against the presented request.
    ///
    /// Called when a candidate entry was found for the request's key,
    /// just before it would be served.
    fn fresh(&self, req: &Request, entry: &Entry) -> Freshness;
}

/// Status codes a cache is allowed to store, per RFC 7234 §3: the codes
/// defined as heuristically cacheable by RFC 7231 §6.1.
pub(crate) fn storable_status(status: StatusCode) -> bool {
    matches!(
        status.as_u16(),
        200 | 203 | 204 | 206 | 300 | 301 | 404 | 405 | 410 | 414 | 501
    )
}
