//! HTTP transport abstraction for tile downloads.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Fixed legacy User-Agent sent with every tile request.
///
/// Some tile servers reject requests without a browser-looking User-Agent;
/// this string matches what the original desktop viewer sent for years.
pub const LEGACY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows; U; MSIE 6.0; Windows NT 5.1; SV1; .NET CLR 2.0.50727)";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur while fetching a tile over the network.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code
        status: u16,
        /// Request URL
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async HTTP GET abstraction for tile downloads.
///
/// Dyn-compatible so the fetch manager can hold `Arc<dyn TileFetcher>` and
/// tests can inject a mock transport.
pub trait TileFetcher: Send + Sync {
    /// Fetch the full response body for `url`.
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// Default fetcher backed by reqwest.
///
/// Matches the original viewer's transport behavior: TLS peer verification
/// is intentionally disabled, the fixed legacy User-Agent is always sent,
/// and transport-level response caching is preferred where the stack
/// provides it.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create a fetcher with a custom timeout in seconds.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(LEGACY_USER_AGENT)
            // Tile servers with self-signed or mismatched certificates are
            // common on private networks; peer verification stays off to
            // match the original viewer's transport.
            .danger_accept_invalid_certs(true)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl TileFetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();

        Box::pin(async move {
            trace!(url = %url, "HTTP GET starting");

            let response = match client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(
                        url = %url,
                        error = %e,
                        is_connect = e.is_connect(),
                        is_timeout = e.is_timeout(),
                        "HTTP request failed"
                    );
                    return Err(FetchError::Transport(e.to_string()));
                }
            };

            let status = response.status();
            if !status.is_success() {
                warn!(url = %url, status = status.as_u16(), "HTTP error status");
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                });
            }

            match response.bytes().await {
                Ok(bytes) => {
                    debug!(url = %url, bytes = bytes.len(), "HTTP response body read");
                    Ok(bytes)
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to read response body");
                    Err(FetchError::Transport(e.to_string()))
                }
            }
        })
    }
}
