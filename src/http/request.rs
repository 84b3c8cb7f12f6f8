//! Client-side HTTP request construction.
//!
//! Requests carry an absolute [`Url`] rather than a bare path: the cache
//! keys on the full URL, and the transport derives host, port, and
//! request-target from it.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use url::Url;

use super::{Headers, Method};

/// Errors produced when constructing a request from a URL string.
#[derive(Debug, Error)]
pub enum InvalidUrl {
    #[error("URL parse error: {0}")]
    Parse(#[from] url::ParseError),

    #[error("URL has no host: {url}")]
    MissingHost { url: String },
}

/// An outgoing HTTP request.
///
/// # Examples
///
/// ```
/// use cachet::http::Request;
///
/// let request = Request::get("http://example.com/feed?page=2")
///     .unwrap()
///     .header("Accept", "application/json");
///
/// assert_eq!(request.method().as_str(), "GET");
/// assert_eq!(request.url().host_str(), Some("example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Creates a request with the given method and an already-parsed URL.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a `GET` request from an absolute URL string.
    ///
    /// # Errors
    ///
    /// - [`InvalidUrl::Parse`] — the string is not an absolute URL.
    /// - [`InvalidUrl::MissingHost`] — the URL parses but names no host
    ///   (e.g. `mailto:` or `file:` forms).
    pub fn get(url: impl AsRef<str>) -> Result<Self, InvalidUrl> {
        Self::with_method(Method::Get, url.as_ref())
    }

    /// Creates a `HEAD` request from an absolute URL string.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Request::get`].
    pub fn head(url: impl AsRef<str>) -> Result<Self, InvalidUrl> {
        Self::with_method(Method::Head, url.as_ref())
    }

    fn with_method(method: Method, url: &str) -> Result<Self, InvalidUrl> {
        let parsed = Url::parse(url)?;
        if parsed.host_str().is_none() {
            return Err(InvalidUrl::MissingHost {
                url: url.to_owned(),
            });
        }
        Ok(Self::new(method, parsed))
    }

    /// Appends a request header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body from anything byte-like.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Serializes the HTTP/1.1 request line (`GET /path?query HTTP/1.1\r\n`).
    pub(crate) fn write_request_line(&self, buf: &mut BytesMut) {
        let path = self.url.path();
        match self.url.query() {
            Some(query) => {
                buf.put(format!("{} {path}?{query} HTTP/1.1\r\n", self.method).as_bytes())
            }
            None => buf.put(format!("{} {path} HTTP/1.1\r\n", self.method).as_bytes()),
        }
    }

    /// Serializes the request head — request line plus caller headers — in
    /// HTTP/1.1 wire format, ending with the blank line.
    ///
    /// Only caller-supplied headers are written; the transport adds its
    /// own (`Host`, `Connection`, `Content-Length`) when sending.
    pub(crate) fn write_head(&self, buf: &mut BytesMut) {
        self.write_request_line(buf);
        buf.put(self.headers.to_string().as_bytes());
        buf.put(&b"\r\n"[..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_builds_absolute_request() {
        let req = Request::get("http://example.com/feed").unwrap();
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.url().as_str(), "http://example.com/feed");
        assert!(req.headers().is_empty());
        assert!(req.body().is_empty());
    }

    #[test]
    fn head_sets_method() {
        let req = Request::head("http://example.com/").unwrap();
        assert_eq!(req.method(), &Method::Head);
    }

    #[test]
    fn rejects_relative_url() {
        assert!(matches!(
            Request::get("/feed"),
            Err(InvalidUrl::Parse(_))
        ));
    }

    #[test]
    fn rejects_url_without_host() {
        assert!(matches!(
            Request::get("mailto:someone@example.com"),
            Err(InvalidUrl::MissingHost { .. })
        ));
    }

    #[test]
    fn header_chaining_is_additive() {
        let req = Request::get("http://example.com/")
            .unwrap()
            .header("Accept", "text/html")
            .header("Accept-Language", "en-US");
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.headers().get("accept-language"), Some("en-US"));
    }

    #[test]
    fn write_head_wire_format() {
        let req = Request::get("http://example.com/search?q=rust")
            .unwrap()
            .header("Accept", "*/*");
        let mut buf = BytesMut::new();
        req.write_head(&mut buf);
        assert_eq!(&buf[..], b"GET /search?q=rust HTTP/1.1\r\nAccept: */*\r\n\r\n");
    }

    #[test]
    fn write_head_defaults_to_root_path() {
        let req = Request::get("http://example.com").unwrap();
        let mut buf = BytesMut::new();
        req.write_head(&mut buf);
        assert_eq!(&buf[..], b"GET / HTTP/1.1\r\n\r\n");
    }
}
