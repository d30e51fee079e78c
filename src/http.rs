//! HTTP client seam used by the catalog and the fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;

use crate::error::HttpError;

/// User-Agent sent with desktop-browser requests.
///
/// The CSS API only serves WOFF2 sources to browsers it recognizes.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

/// Which User-Agent a request should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Agent {
    /// The HTTP library's own identification.
    #[default]
    Default,
    /// A desktop browser, needed to receive WOFF2 responses.
    Browser,
}

/// Minimal GET-only HTTP client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch `url` and return the body of a 2xx response.
    async fn get(&self, url: &str, agent: Agent) -> Result<Vec<u8>, HttpError>;
}

/// `HttpClient` backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    /// Shared connection pool.
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gfont/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| HttpError::Transport {
                message: error.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, agent: Agent) -> Result<Vec<u8>, HttpError> {
        let mut request = self.client.get(url);
        if agent == Agent::Browser {
            request = request.header(USER_AGENT, BROWSER_USER_AGENT);
        }

        let response = request.send().await.map_err(|error| HttpError::Transport {
            message: error.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(HttpError::Status {
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|error| HttpError::Transport {
            message: error.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Strip the `)]}'` anti-hijacking prefix some endpoints put before JSON.
pub fn strip_json_prefix(body: &[u8]) -> &[u8] {
    body.strip_prefix(b")]}'").unwrap_or(body)
}
