//! A from-scratch async HTTP/1.1 client over [`tokio::net::TcpStream`].
//!
//! One connection per request, `Connection: close` pinned on every
//! exchange: the response is complete when the origin closes the socket,
//! which keeps body framing honest even for origins that send neither
//! `Content-Length` nor chunked encoding. Plain `http` only.

use std::net::IpAddr;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use url::Host;

use crate::http::directives::Directives;
use crate::http::{Headers, Method, Request, Response};

use super::{Client, ClientError};

/// Maximum size of a complete HTTP response we will buffer before rejecting it (8 MiB).
const MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024;

/// Initial read buffer capacity per exchange.
const INITIAL_BUF_SIZE: usize = 4096;

/// Headers that belong to a single connection and must not survive into
/// a response handed to callers or written to the cache (RFC 7230 §6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// The built-in HTTP/1.1 transport.
///
/// # Examples
///
/// ```
/// use cachet::client::{Client, Http1Client};
/// use cachet::http::Request;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Http1Client::new();
/// let request = Request::get("http://example.com/")?;
/// let response = client.execute(&request).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Http1Client;

impl Http1Client {
    /// Creates a new transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Client for Http1Client {
    async fn execute(&self, req: &Request) -> Result<Response, ClientError> {
        let url = req.url();
        if url.scheme() != "http" {
            return Err(ClientError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let host = url.host_str().ok_or(ClientError::MissingHost)?;
        let port = url.port_or_known_default().unwrap_or(80);

        debug!(host = %host, port, "connecting");
        let mut stream = match url.host() {
            Some(Host::Domain(domain)) => TcpStream::connect((domain, port)).await,
            Some(Host::Ipv4(ip)) => TcpStream::connect((IpAddr::V4(ip), port)).await,
            Some(Host::Ipv6(ip)) => TcpStream::connect((IpAddr::V6(ip), port)).await,
            None => return Err(ClientError::MissingHost),
        }
        .map_err(|e| ClientError::Connect {
            host: host.to_owned(),
            port,
            source: e,
        })?;

        stream.write_all(&encode_request(req)).await?;
        stream.flush().await?;

        // Read until the origin closes; Connection: close makes EOF the
        // end-of-response marker.
        let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);
        loop {
            let bytes_read = stream.read_buf(&mut buf).await?;
            if bytes_read == 0 {
                break;
            }
            if buf.len() > MAX_RESPONSE_SIZE {
                return Err(ClientError::TooLarge {
                    limit: MAX_RESPONSE_SIZE,
                });
            }
        }

        let buf = buf.freeze();
        let (mut response, body_offset) = Response::parse_head(&buf)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        let body = frame_body(req, &response, buf.slice(body_offset..))?;
        strip_hop_by_hop(response.headers_mut());

        debug!(
            status = %response.status(),
            bytes = body.len(),
            "response received"
        );
        Ok(response.body_bytes(body))
    }
}

/// Serializes the full outgoing request: the caller's request line and
/// headers, plus the transport's own `Host`, `Connection: close`, and
/// `Content-Length` where the caller did not set them.
fn encode_request(req: &Request) -> BytesMut {
    let url = req.url();
    let mut wire = BytesMut::with_capacity(INITIAL_BUF_SIZE);
    req.write_request_line(&mut wire);

    let mut headers = req.headers().clone();
    if !headers.contains("host") {
        if let Some(host) = url.host_str() {
            // a non-default port travels with the host
            match url.port() {
                Some(port) => headers.insert("Host", format!("{host}:{port}")),
                None => headers.insert("Host", host),
            }
        }
    }
    headers.set("Connection", "close");
    if !req.body().is_empty() && !headers.contains("content-length") {
        headers.insert("Content-Length", req.body().len().to_string());
    }

    wire.put(headers.to_string().as_bytes());
    wire.put(&b"\r\n"[..]);
    wire.put(req.body().as_ref());
    wire
}

/// Applies HTTP/1.1 body framing rules to the bytes that followed the
/// response head.
fn frame_body(req: &Request, response: &Response, rest: Bytes) -> Result<Bytes, ClientError> {
    // responses that never carry a body (RFC 7230 §3.3.3)
    let status = response.status().as_u16();
    if req.method() == &Method::Head || status == 204 || status == 304 {
        return Ok(Bytes::new());
    }

    let transfer_encoding = Directives::parse(response.headers(), "Transfer-Encoding");
    if transfer_encoding.has("chunked") {
        return decode_chunked(&rest);
    }

    if let Some(length) = content_length(response.headers()) {
        if rest.len() < length {
            return Err(ClientError::MalformedResponse(format!(
                "body is {} bytes but Content-Length says {length}",
                rest.len()
            )));
        }
        return Ok(rest.slice(..length));
    }

    // close-delimited: everything until EOF is the body
    Ok(rest)
}

fn content_length(headers: &Headers) -> Option<usize> {
    headers.get("Content-Length")?.trim().parse().ok()
}

/// Decodes a `Transfer-Encoding: chunked` body. Chunk extensions and
/// trailers are ignored; a declared chunk size past `MAX_RESPONSE_SIZE`
/// is rejected before any of it is read.
fn decode_chunked(mut input: &[u8]) -> Result<Bytes, ClientError> {
    let mut body = BytesMut::new();

    loop {
        let line_end = find_crlf(input).ok_or_else(|| {
            ClientError::MalformedResponse("truncated chunk size line".to_owned())
        })?;
        let size_line = std::str::from_utf8(&input[..line_end])
            .map_err(|_| ClientError::MalformedResponse("non-ASCII chunk size".to_owned()))?;
        let size_field = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_field, 16).map_err(|_| {
            ClientError::MalformedResponse(format!("invalid chunk size: {size_field:?}"))
        })?;
        // cap declared sizes before they reach the bounds arithmetic
        if size > MAX_RESPONSE_SIZE {
            return Err(ClientError::TooLarge {
                limit: MAX_RESPONSE_SIZE,
            });
        }
        input = &input[line_end + 2..];

        if size == 0 {
            break;
        }

        if input.len() < size + 2 {
            return Err(ClientError::MalformedResponse(
                "truncated chunk data".to_owned(),
            ));
        }
        body.extend_from_slice(&input[..size]);
        if &input[size..size + 2] != b"\r\n" {
            return Err(ClientError::MalformedResponse(
                "chunk data missing CRLF terminator".to_owned(),
            ));
        }
        input = &input[size + 2..];
    }

    Ok(body.freeze())
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Removes connection-scoped headers: the fixed RFC 7230 §6.1 set plus
/// any header the `Connection` value names.
fn strip_hop_by_hop(headers: &mut Headers) {
    let named: Vec<String> = Directives::parse(headers, "Connection")
        .iter()
        .map(str::to_owned)
        .collect();
    for name in named {
        headers.remove(&name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn chunked_single_chunk() {
        let body = decode_chunked(b"5\r\nhello\r\n0\r\n\r\n").unwrap();
        assert_eq!(body.as_ref(), b"hello");
    }

    #[test]
    fn chunked_multiple_chunks() {
        let body = decode_chunked(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n").unwrap();
        assert_eq!(body.as_ref(), b"Wikipedia");
    }

    #[test]
    fn chunked_hex_sizes_and_extensions() {
        let body = decode_chunked(b"a;name=value\r\n0123456789\r\n0\r\n\r\n").unwrap();
        assert_eq!(body.as_ref(), b"0123456789");
    }

    #[test]
    fn chunked_empty_body() {
        let body = decode_chunked(b"0\r\n\r\n").unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn chunked_truncated_data() {
        assert!(matches!(
            decode_chunked(b"5\r\nhel"),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn chunked_invalid_size() {
        assert!(matches!(
            decode_chunked(b"xyz\r\n\r\n"),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn chunked_rejects_chunk_past_the_size_cap() {
        assert!(matches!(
            decode_chunked(b"f00000\r\nxx"),
            Err(ClientError::TooLarge { .. })
        ));
        // size lines that would wrap the bounds arithmetic
        assert!(matches!(
            decode_chunked(b"ffffffffffffffff\r\nxx"),
            Err(ClientError::TooLarge { .. })
        ));
        assert!(matches!(
            decode_chunked(b"fffffffffffffffe\r\nxx"),
            Err(ClientError::TooLarge { .. })
        ));
    }

    #[test]
    fn hop_by_hop_headers_are_stripped() {
        let mut headers: Headers = [
            ("Connection", "keep-alive, x-session-token"),
            ("Keep-Alive", "timeout=5"),
            ("Transfer-Encoding", "chunked"),
            ("X-Session-Token", "abc"),
            ("Content-Type", "text/html"),
        ]
        .into_iter()
        .collect();

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("content-type"), Some("text/html"));
    }

    #[test]
    fn encode_request_adds_transport_headers() {
        let req = Request::get("http://example.com/feed")
            .unwrap()
            .header("Accept", "text/html");
        let wire = String::from_utf8(encode_request(&req).to_vec()).unwrap();

        assert!(wire.starts_with("GET /feed HTTP/1.1\r\n"));
        assert!(wire.contains("Accept: text/html\r\n"));
        assert!(wire.contains("Host: example.com\r\n"));
        assert!(wire.contains("Connection: close\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[test]
    fn encode_request_keeps_explicit_port_in_host() {
        let req = Request::get("http://example.com:8080/").unwrap();
        let wire = String::from_utf8(encode_request(&req).to_vec()).unwrap();
        assert!(wire.contains("Host: example.com:8080\r\n"));
    }

    #[test]
    fn encode_request_writes_body_and_length() {
        let req = Request::new(Method::Post, "http://example.com/submit".parse().unwrap())
            .body_bytes("name=ferris");
        let wire = String::from_utf8(encode_request(&req).to_vec()).unwrap();
        assert!(wire.contains("Content-Length: 11\r\n"));
        assert!(wire.ends_with("\r\n\r\nname=ferris"));
    }

    #[test]
    fn frame_body_empty_for_head_and_no_content() {
        let req = Request::head("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::OK).header("Content-Length", "5");
        let body = frame_body(&req, &resp, Bytes::from_static(b"xxxxx")).unwrap();
        assert!(body.is_empty());

        let get = Request::get("http://example.com/").unwrap();
        let no_content = Response::new(StatusCode::NO_CONTENT);
        let body = frame_body(&get, &no_content, Bytes::new()).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn frame_body_respects_content_length() {
        let req = Request::get("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::OK).header("Content-Length", "5");
        let body = frame_body(&req, &resp, Bytes::from_static(b"hello extra")).unwrap();
        assert_eq!(body.as_ref(), b"hello");
    }

    #[test]
    fn frame_body_rejects_short_content_length() {
        let req = Request::get("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::OK).header("Content-Length", "10");
        assert!(matches!(
            frame_body(&req, &resp, Bytes::from_static(b"hi")),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn frame_body_defaults_to_close_delimited() {
        let req = Request::get("http://example.com/").unwrap();
        let resp = Response::new(StatusCode::OK);
        let body = frame_body(&req, &resp, Bytes::from_static(b"everything")).unwrap();
        assert_eq!(body.as_ref(), b"everything");
    }
}
