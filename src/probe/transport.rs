//! HTTP transport used for reachability probes.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Status (and optionally body) of a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level probe failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Issues a single GET. Timeouts are enforced by the caller.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn get(&self, url: &Url, read_body: bool) -> Result<ProbeResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn get(&self, url: &Url, read_body: bool) -> Result<ProbeResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = if read_body {
            Some(
                response
                    .text()
                    .await
                    .map_err(|e| TransportError::Body(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(ProbeResponse { status, body })
    }
}
