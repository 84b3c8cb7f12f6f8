//! Cache key derivation.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::http::Request;

/// Derives the storage key for a request from its method and absolute URL.
///
/// Responses that vary by request headers share this key; a selecting-
/// header mismatch is caught at freshness time via `Vary`, not here.
/// Collisions are a tolerated correctness risk of the hashing scheme —
/// there is no stored-key disambiguation.
pub(crate) fn request_key(req: &Request) -> u64 {
    let mut hasher = DefaultHasher::new();
    req.method().as_str().hash(&mut hasher);
    req.url().as_str().hash(&mut hasher);
    hasher.finish()
}
