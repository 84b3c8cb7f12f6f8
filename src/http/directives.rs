//! Cache directive parsing per RFC 7234.
//!
//! Pure helpers over [`Headers`]: extracting `Cache-Control` tokens,
//! `max-age`, `Expires`/`Date` timestamps, response lifetime, and the
//! `Vary` selecting-header comparison. Strategies are built out of these;
//! nothing here holds state.

use std::time::{Duration, SystemTime};

use crate::http::date as http_date;
use crate::http::Headers;

/// A parsed set of cache directives: lowercased, trimmed, deduplicated
/// tokens in first-seen order.
///
/// # Examples
///
/// ```
/// use cachet::http::directives::Directives;
///
/// let d = Directives::from_value("Public, MAX-AGE=60, public");
/// assert!(d.has("public"));
/// assert!(d.has("max-age=60"));
/// assert_eq!(d.iter().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    tokens: Vec<String>,
}

impl Directives {
    /// Parses a directive set from a raw header value.
    pub fn from_value(value: &str) -> Self {
        let mut directives = Self::default();
        for token in split(value) {
            directives.push(token);
        }
        directives
    }

    /// Parses a directive set from the first value of the named header.
    pub fn parse(headers: &Headers, name: &str) -> Self {
        headers.get(name).map(Self::from_value).unwrap_or_default()
    }

    /// Returns `true` if the set contains the given token.
    ///
    /// The query is lowercased before comparison, so `has("No-Cache")`
    /// and `has("no-cache")` are equivalent.
    pub fn has(&self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        self.tokens.iter().any(|t| *t == token)
    }

    /// Returns an iterator over the tokens in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Returns `true` if the set holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn push(&mut self, token: String) {
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
    }
}

/// Splits a comma-separated header value into normalized tokens:
/// trimmed, lowercased, empties dropped.
fn split(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Returns `true` if `Cache-Control` carries the `no-store` directive.
pub fn no_store(headers: &Headers) -> bool {
    Directives::parse(headers, "Cache-Control").has("no-store")
}

/// Returns `true` if either `Cache-Control` or the legacy `Pragma`
/// header carries the `no-cache` directive.
pub fn no_cache(headers: &Headers) -> bool {
    Directives::parse(headers, "Cache-Control").has("no-cache")
        || Directives::parse(headers, "Pragma").has("no-cache")
}

/// Extracts the `max-age` directive from `Cache-Control`.
///
/// Returns `None` when no `max-age=` token is present. A token whose
/// value does not parse, or parses negative, yields `Some(Duration::ZERO)`
/// rather than `None`: the directive was present, its value just grants
/// no freshness.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cachet::http::directives::max_age;
/// use cachet::http::Headers;
///
/// let mut h = Headers::new();
/// h.insert("Cache-Control", "public, max-age=300");
/// assert_eq!(max_age(&h), Some(Duration::from_secs(300)));
/// ```
pub fn max_age(headers: &Headers) -> Option<Duration> {
    let value = headers.get("Cache-Control")?;
    for token in split(value) {
        if token.starts_with("max-age") {
            if let Some(i) = token.find('=') {
                let secs = token[i + 1..].parse::<i64>().unwrap_or(0).max(0);
                return Some(Duration::from_secs(secs as u64));
            }
        }
    }
    None
}

/// Parses the `Expires` header, `None` on absence or parse failure.
pub fn expires(headers: &Headers) -> Option<SystemTime> {
    headers.get("Expires").and_then(http_date::parse)
}

/// Parses the `Date` header, `None` on absence or parse failure.
pub fn date(headers: &Headers) -> Option<SystemTime> {
    headers.get("Date").and_then(http_date::parse)
}

/// Computes the explicit freshness lifetime of a response per
/// RFC 7234 §4.2.1.
///
/// `max-age` wins when present, even at zero; otherwise `Expires − Date`
/// when both parse, with a pre-dated `Expires` clamping to zero. `None`
/// means the response declared no lifetime at all.
pub fn lifetime(headers: &Headers) -> Option<Duration> {
    if let Some(age) = max_age(headers) {
        return Some(age);
    }
    let expires = expires(headers)?;
    let date = date(headers)?;
    Some(expires.duration_since(date).unwrap_or(Duration::ZERO))
}

/// Compares selecting headers per RFC 7234 §4.1.
///
/// Header names are nominated by the stored response's `Vary` value (and
/// by a `Vary` recorded on the stored request, if any). For every
/// nominated name, the current request's first value must equal the one
/// recorded with the stored entry; an absent header compares as empty.
/// An empty or absent `Vary` trivially matches.
pub fn selecting_headers_match(
    current: &Headers,
    stored_request: &Headers,
    stored_response: &Headers,
) -> bool {
    let mut names = Directives::parse(stored_response, "Vary");
    for name in split(stored_request.get("Vary").unwrap_or_default()) {
        names.push(name);
    }

    names
        .iter()
        .all(|name| current.get(name).unwrap_or("") == stored_request.get(name).unwrap_or(""))
}
