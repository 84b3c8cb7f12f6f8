//! HTTP transports: the [`Client`] trait and the built-in HTTP/1.1
//! implementation.
//!
//! The cache is transport-agnostic — anything that can turn a [`Request`]
//! into a [`Response`] can sit behind it. [`Http1Client`] covers plain
//! `http` origins; TLS, proxies, and connection pooling are custom
//! [`Client`] territory.

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{Request, Response};
use crate::BoxError;

pub mod http1;

pub use http1::Http1Client;

/// Errors produced by a transport.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request URL has no host")]
    MissingHost,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response exceeds maximum allowed size of {limit} bytes")]
    TooLarge { limit: usize },

    /// Escape hatch for custom transports wrapping their own error types.
    #[error("transport error: {0}")]
    Other(#[from] BoxError),
}

/// An HTTP transport.
///
/// Implementations execute a request against the network and return the
/// complete response, body included. One client instance serves every
/// request passing through the cache, so implementations must be safe to
/// share.
#[async_trait]
pub trait Client: Send + Sync {
    /// Performs the given request against the origin.
    async fn execute(&self, req: &Request) -> Result<Response, ClientError>;
}
