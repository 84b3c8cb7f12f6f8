//! The stored form of a cached exchange.
//!
//! An entry is encoded as the originating request's head followed by the
//! full response, both in HTTP/1.1 wire format; everything after the
//! response's blank line is body. Carrying the request head lets
//! freshness checks compare the stored request's selecting headers
//! against the request being presented now.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

use crate::http::response::ResponseError;
use crate::http::{Headers, Request, Response};

/// Errors that can occur while decoding a stored entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry is truncated — stored head incomplete")]
    Incomplete,

    #[error("stored request head is malformed: {0}")]
    Request(httparse::Error),

    #[error("stored response is malformed: {0}")]
    Response(#[from] ResponseError),
}

/// A cached exchange: the request headers recorded at store time plus
/// the stored response.
#[derive(Debug, Clone)]
pub struct Entry {
    request_headers: Headers,
    response: Response,
}

impl Entry {
    /// Maximum number of headers we support in a stored request head.
    const MAX_HEADERS: usize = 64;

    /// Assembles an entry from already-parsed parts.
    pub fn new(request_headers: Headers, response: Response) -> Self {
        Self {
            request_headers,
            response,
        }
    }

    /// Serializes a request/response pair into the storable blob.
    ///
    /// Only the request's head is recorded — caller headers, not the
    /// transport's additions, and no request body.
    pub fn encode(req: &Request, resp: &Response) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            128 + (req.headers().len() + resp.headers().len()) * 48 + resp.body().len(),
        );
        req.write_head(&mut buf);
        resp.write_to(&mut buf);
        buf.freeze()
    }

    /// Decodes a blob produced by [`Entry::encode`].
    ///
    /// # Errors
    ///
    /// - [`EntryError::Incomplete`] — the blob ends before either head does.
    /// - [`EntryError::Request`] / [`EntryError::Response`] — a head is
    ///   present but malformed.
    pub fn decode(blob: Bytes) -> Result<Self, EntryError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_req = httparse::Request::new(&mut headers);

        let head_len = match raw_req.parse(&blob) {
            Ok(httparse::Status::Complete(offset)) => offset,
            Ok(httparse::Status::Partial) => return Err(EntryError::Incomplete),
            Err(e) => return Err(EntryError::Request(e)),
        };

        let mut request_headers = Headers::with_capacity(raw_req.headers.len());
        for header in raw_req.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                request_headers.insert(header.name, value);
            }
        }

        let (response, body_offset) = Response::parse_head(&blob[head_len..])?;
        let response = response.body_bytes(blob.slice(head_len + body_offset..));

        Ok(Self {
            request_headers,
            response,
        })
    }

    /// Headers of the request that produced this response.
    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    /// The stored response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Consumes the entry, yielding the response for the caller.
    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn encode_decode_round_trip() {
        let req = Request::get("http://example.com/feed?page=2")
            .unwrap()
            .header("Accept-Language", "en-US");
        let resp = Response::new(StatusCode::OK)
            .header("Cache-Control", "max-age=60")
            .header("Vary", "Accept-Language")
            .body_bytes("the payload");

        let entry = Entry::decode(Entry::encode(&req, &resp)).unwrap();

        assert_eq!(
            entry.request_headers().get("accept-language"),
            Some("en-US")
        );
        assert_eq!(entry.response().status(), StatusCode::OK);
        assert_eq!(entry.response().headers(), resp.headers());
        assert_eq!(entry.response().body(), resp.body());
    }

    #[test]
    fn round_trip_preserves_empty_body() {
        let req = Request::head("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::NO_CONTENT).header("Cache-Control", "max-age=5");

        let entry = Entry::decode(Entry::encode(&req, &resp)).unwrap();
        assert!(entry.response().body().is_empty());
        assert_eq!(entry.response().status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn body_containing_header_terminator_survives() {
        let req = Request::get("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::OK).body_bytes("chunk\r\n\r\nmore");

        let entry = Entry::decode(Entry::encode(&req, &resp)).unwrap();
        assert_eq!(entry.response().body().as_ref(), b"chunk\r\n\r\nmore");
    }

    #[test]
    fn truncated_blob_is_incomplete() {
        assert!(matches!(
            Entry::decode(Bytes::from_static(b"GET / HT")),
            Err(EntryError::Incomplete)
        ));
        assert!(matches!(
            Entry::decode(Bytes::new()),
            Err(EntryError::Incomplete)
        ));
    }

    #[test]
    fn garbage_blob_is_a_request_error() {
        assert!(matches!(
            Entry::decode(Bytes::from_static(b"\x00\x01\x02\r\n\r\n")),
            Err(EntryError::Request(_))
        ));
    }

    #[test]
    fn blob_missing_response_is_an_error() {
        // a valid request head followed by nothing
        let req = Request::get("http://example.com/").unwrap();
        let mut buf = BytesMut::new();
        req.write_head(&mut buf);

        assert!(matches!(
            Entry::decode(buf.freeze()),
            Err(EntryError::Response(_))
        ));
    }
}
