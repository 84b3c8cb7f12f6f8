//! The aggressive cache strategy.

use std::time::{Duration, SystemTime};

use crate::cache::Entry;
use crate::http::{directives, Request, Response};

use super::{storable_status, Freshness, Strategy};

/// A strategy that caches every `GET` and `HEAD` response regardless of
/// cache-control directives, for a fixed lifetime.
///
/// Useful against origins that send no cache metadata, or whose metadata
/// is too conservative for the caller's tolerance for staleness.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cachet::strategy::Aggressive;
///
/// // cache everything for an hour
/// let strategy = Aggressive::new(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Aggressive {
    lifetime: Duration,
}

impl Aggressive {
    /// The lifetime applied when none (or zero) is configured: one day.
    pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

    /// Creates a strategy with the given lifetime.
    ///
    /// A zero lifetime falls back to [`Self::DEFAULT_LIFETIME`].
    pub fn new(lifetime: Duration) -> Self {
        let lifetime = if lifetime > Duration::ZERO {
            lifetime
        } else {
            Self::DEFAULT_LIFETIME
        };
        Self { lifetime }
    }

    /// Returns the effective lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl Default for Aggressive {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIFETIME)
    }
}

impl Strategy for Aggressive {
    /// Every `GET`/`HEAD` request may use the cache; directives are ignored.
    fn cache(&self, req: &Request) -> bool {
        req.method().is_cacheable()
    }

    /// Every `GET`/`HEAD` response with a storable status is stored,
    /// `no-store` or not.
    fn store(&self, req: &Request, resp: &Response) -> bool {
        req.method().is_cacheable() && storable_status(resp.status())
    }

    /// Fresh while the response's `Date` is within the configured
    /// lifetime; [`Freshness::Transparent`] otherwise — a response
    /// without a usable `Date` offers nothing to trust.
    fn fresh(&self, _req: &Request, entry: &Entry) -> Freshness {
        if let Some(date) = directives::date(entry.response().headers()) {
            let elapsed = SystemTime::now()
                .duration_since(date)
                .unwrap_or(Duration::ZERO);
            if elapsed < self.lifetime {
                return Freshness::Fresh;
            }
        }
        Freshness::Transparent
    }
}
