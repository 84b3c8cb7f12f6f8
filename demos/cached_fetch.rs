//! Fetches the same URL twice through an `HttpCache` and shows the second
//! response coming out of memory.
//!
//! Run with:
//! ```sh
//! cargo run --example cached_fetch
//! ```

use std::time::SystemTime;

use cachet::http::date;
use cachet::{HttpCache, Request};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), cachet::BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cachet=debug")),
        )
        .init();

    let origin = spawn_origin().await?;
    let cache = HttpCache::new();

    for attempt in 1..=2 {
        let request = Request::get(format!("http://{origin}/quote"))?;
        let response = cache.execute(request).await?;
        println!(
            "attempt {attempt}: {} {}",
            response.status(),
            String::from_utf8_lossy(response.body())
        );
    }

    let stats = cache.stats();
    println!(
        "hits: {}, misses: {}, stores: {}, hit rate: {:.0}%",
        stats.hits(),
        stats.misses(),
        stats.stores(),
        stats.hit_rate() * 100.0
    );

    Ok(())
}

/// Starts a throwaway origin that serves one cacheable quote to every request.
async fn spawn_origin() -> Result<std::net::SocketAddr, cachet::BoxError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut head = [0u8; 1024];
                let _ = stream.read(&mut head).await;

                let body = "Simplicity is prerequisite for reliability.";
                let response = format!(
                    "HTTP/1.1 200 OK\r\nDate: {}\r\nCache-Control: max-age=300\r\nContent-Length: {}\r\n\r\n{body}",
                    date::format(SystemTime::now()),
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    Ok(addr)
}
