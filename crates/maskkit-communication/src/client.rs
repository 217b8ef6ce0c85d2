//! Shared HTTP plumbing for the annotation backend.
//!
//! Every remote collaborator (oracle, labels, session) talks to the same
//! backend, so they share one `reqwest::Client` and base URL. Response bodies
//! are returned as text and decoded by pure functions for testability.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of one HTTP exchange, before it is mapped into a domain error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
    /// Sending the request or reading the body failed
    #[error("Request failed: {0}")]
    Request(String),
    /// The backend answered with a non-success status
    #[error("Status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

// =============================================================================
// CLIENT
// =============================================================================

/// Connection settings for the backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Thin JSON-over-HTTP wrapper around the backend routes
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins a route onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<String, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::finish(response).await
    }

    pub async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::finish(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::finish(response).await
    }

    async fn finish(response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Decodes a JSON response body.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, TransportError> {
    serde_json::from_str(text).map_err(|e| TransportError::Decode(e.to_string()))
}
