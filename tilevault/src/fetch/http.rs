//! HTTP client abstraction for testability

use std::time::Duration;

use thiserror::Error;

use crate::store::{BoxFuture, TileBlob, DEFAULT_CONTENT_TYPE};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header. Public tile servers reject empty agents.
pub const DEFAULT_USER_AGENT: &str = concat!("tilevault/", env!("CARGO_PKG_VERSION"));

/// Errors from fetching a single tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body could not be read.
    #[error("failed to read response from {url}: {message}")]
    Body { url: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Trait for asynchronous tile downloads.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// Succeeds only when the transport succeeds AND the status is 2xx.
    ///
    /// # Returns
    ///
    /// The response body and its content type.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<TileBlob, FetchError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Creates a new ReqwestClient with custom timeout and user agent.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<TileBlob, FetchError>> {
        Box::pin(async move {
            let response =
                self.client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;

            // Check HTTP status
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();

            // Read response body
            let data = response.bytes().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            Ok(TileBlob::new(data, content_type))
        })
    }
}

#[cfg(test)]
pub mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Mock HTTP client for testing.
    ///
    /// Answers every URL with `response`, except URLs in `failures`, which
    /// get a 503.
    pub struct MockHttpClient {
        pub response: Result<TileBlob, FetchError>,
        pub failures: HashSet<String>,
        pub calls: AtomicUsize,
    }

    impl MockHttpClient {
        pub fn ok(data: &[u8]) -> Self {
            Self {
                response: Ok(TileBlob::new(data.to_vec(), "image/png")),
                failures: HashSet::new(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing_on<I: IntoIterator<Item = String>>(mut self, urls: I) -> Self {
            self.failures.extend(urls);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<TileBlob, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.failures.contains(url) {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 503,
                })
            } else {
                self.response.clone()
            };
            Box::pin(async move {
                tokio::task::yield_now().await;
                result
            })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::ok(&[1, 2, 3, 4]);

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap().data().as_ref(), &[1, 2, 3, 4]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::ok(&[1]).failing_on(["http://bad".to_string()]);

        let result = mock.get("http://bad").await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Status {
                url: "http://bad".to_string(),
                status: 503
            }
        );
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::with_settings(Duration::from_secs(5), "test-agent").is_ok());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://t/1.png".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://t/1.png");
    }
}
