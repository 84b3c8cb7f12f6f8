//! The standards-compliant cache strategy.

use std::time::Duration;

use crate::cache::Entry;
use crate::http::{directives, Request, Response};

use super::{storable_status, Freshness, Strategy};

/// The RFC 7234 cache strategy.
///
/// Honors `no-store` and `no-cache` on both sides, requires an explicit
/// positive lifetime (`max-age` or `Expires`/`Date`) before storing, and
/// bypasses the cache when selecting headers stop matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc7234;

impl Strategy for Rfc7234 {
    /// A request may use the cache when its method is cacheable and it
    /// does not forbid storage outright.
    fn cache(&self, req: &Request) -> bool {
        req.method().is_cacheable() && !directives::no_store(req.headers())
    }

    /// Storability per RFC 7234 §3.
    fn store(&self, req: &Request, resp: &Response) -> bool {
        // The request method is understood and defined as cacheable.
        if !req.method().is_cacheable() {
            return false;
        }

        // The response status code is defined as cacheable.
        if !storable_status(resp.status()) {
            return false;
        }

        // The "no-store" directive appears in neither request nor response.
        if directives::no_store(req.headers()) || directives::no_store(resp.headers()) {
            return false;
        }

        // The response declares an explicit, positive lifetime.
        matches!(directives::lifetime(resp.headers()), Some(life) if life > Duration::ZERO)
    }

    /// Freshness per RFC 7234 §4.
    fn fresh(&self, req: &Request, entry: &Entry) -> Freshness {
        // Selecting header fields nominated by the stored response must
        // match those presented (§4.1).
        if !directives::selecting_headers_match(
            req.headers(),
            entry.request_headers(),
            entry.response().headers(),
        ) {
            return Freshness::Transparent;
        }

        // Neither the presented request nor the stored response may carry
        // no-cache; with no validation round-trip, that means refetch
        // (§5.2.1.4, §5.2.2.2).
        if directives::no_cache(req.headers()) || directives::no_cache(entry.response().headers()) {
            return Freshness::Stale;
        }

        // The stored response declared a positive lifetime (§4.2).
        if matches!(
            directives::lifetime(entry.response().headers()),
            Some(life) if life > Duration::ZERO
        ) {
            return Freshness::Fresh;
        }

        Freshness::Stale
    }
}
