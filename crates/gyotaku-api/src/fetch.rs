use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};

/// Default cap on a fetched payload: 10 MiB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, FetchError>> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("{0}")]
    Other(String),
}

/// Source of remote content. No retries; redirects are the implementor's
/// business.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// Plain HTTP(S) GET. The body is returned whatever the status code; only
/// transport failures are errors.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gyotaku/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, max_bytes })
    }

    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut resp = self.client.get(url).send().await?;

        if resp.content_length().is_some_and(|len| len > self.max_bytes as u64) {
            return Err(FetchError::TooLarge { limit: self.max_bytes });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = resp.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on loopback and return its URL.
    async fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = sock.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            sock.write_all(head.as_bytes()).await.unwrap();
            sock.write_all(body).await.unwrap();
        });
        format!("http://{addr}/page")
    }

    #[tokio::test]
    async fn returns_body() {
        let url = serve_once("200 OK", b"<html>hello</html>").await;
        let fetcher = HttpFetcher::new(DEFAULT_MAX_PAYLOAD_BYTES).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(&body[..], b"<html>hello</html>");
    }

    #[tokio::test]
    async fn error_status_still_returns_body() {
        let url = serve_once("404 Not Found", b"missing").await;
        let fetcher = HttpFetcher::new(DEFAULT_MAX_PAYLOAD_BYTES).unwrap();
        assert_eq!(&fetcher.fetch(&url).await.unwrap()[..], b"missing");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let url = serve_once("200 OK", b"0123456789").await;
        let fetcher = HttpFetcher::new(4).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn invalid_url_is_transport_error() {
        let fetcher = HttpFetcher::new(DEFAULT_MAX_PAYLOAD_BYTES).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(DEFAULT_MAX_PAYLOAD_BYTES).unwrap();
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
