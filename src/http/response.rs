//! HTTP/1.1 response parsing and serialization using the [`httparse`] crate.
//!
//! Responses arrive from the transport as raw bytes and are re-serialized
//! byte-faithfully when stored: [`Response::write_to`] emits exactly the
//! status line, headers, and body it holds, adding nothing. Framing
//! decisions (`Content-Length`, chunked) belong to the transport.

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Headers, StatusCode};

/// Errors that can occur while parsing an HTTP/1.1 response head.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// An HTTP response as received from a transport or decoded from the cache.
///
/// # Examples
///
/// ```
/// use cachet::http::{Response, StatusCode};
///
/// let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n";
/// let (response, offset) = Response::parse_head(raw).unwrap();
///
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.headers().get("content-type"), Some("text/plain"));
/// assert_eq!(offset, raw.len());
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    version: u8,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Maximum number of headers we support per response.
    const MAX_HEADERS: usize = 64;

    /// Creates an HTTP/1.1 response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: 1,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Parses a response head — status line and headers — from a byte slice.
    ///
    /// Returns the parsed `Response` (body empty) and the byte offset at
    /// which the body begins in `buf`, immediately after the `\r\n\r\n`
    /// terminator. Body framing is the caller's concern: the transport
    /// applies `Content-Length`/chunked rules, the cache attaches the
    /// remainder of the stored blob.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Incomplete`] — more data is needed to complete the head.
    /// - [`ResponseError::Parse`] — the data is malformed and cannot be parsed.
    /// - [`ResponseError::MissingField`] — the status line lacks a version or code.
    pub fn parse_head(buf: &[u8]) -> Result<(Self, usize), ResponseError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_resp = httparse::Response::new(&mut headers);

        let body_offset = match raw_resp.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(ResponseError::Incomplete),
        };

        let version = raw_resp
            .version
            .ok_or(ResponseError::MissingField { field: "version" })?;

        let code = raw_resp
            .code
            .ok_or(ResponseError::MissingField { field: "status" })?;

        let mut header_map = Headers::with_capacity(raw_resp.headers.len());
        for header in raw_resp.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.insert(header.name, value);
            }
        }

        Ok((
            Self {
                status: StatusCode::from_u16(code),
                version,
                headers: header_map,
                body: Bytes::new(),
            },
            body_offset,
        ))
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body from anything byte-like.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the HTTP minor version number (0 = HTTP/1.0, 1 = HTTP/1.1).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access for the transport's hop-by-hop header stripping.
    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the response body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the body is not
    /// valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Serializes the response verbatim in HTTP/1.1 wire format: status
    /// line, headers exactly as held, blank line, body. No headers are
    /// synthesized, so a stored response decodes to the same bytes the
    /// origin sent.
    pub fn write_to(&self, buf: &mut BytesMut) {
        let reason = self.status.canonical_reason().unwrap_or("");
        buf.put(
            format!(
                "HTTP/1.{} {} {reason}\r\n",
                self.version,
                self.status.as_u16()
            )
            .as_bytes(),
        );
        buf.put(self.headers.to_string().as_bytes());
        buf.put(&b"\r\n"[..]);
        buf.put(self.body.as_ref());
    }

    /// Serializes the response into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Bytes {
        let estimated_size = 64 + self.headers.len() * 48 + self.body.len();
        let mut buf = BytesMut::with_capacity(estimated_size);
        self.write_to(&mut buf);
        buf.freeze()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
