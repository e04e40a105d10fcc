//! Front& workflow endpoint client.
//!
//! This crate provides the network boundary of a workflow run:
//!
//! - [`WorkflowTransport`], the seam the engine sends shaped request bodies through
//! - [`WorkflowClient`], the `reqwest`-backed implementation
//! - endpoint validation, so bodies are only posted over HTTPS (or to localhost)
//! - the health probe and image download used by the CLI
//!
//! Requests are never retried. Non-2xx responses surface the status code and
//! the response body; connection failures surface the underlying error text.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use frontand_api::{WorkflowClient, WorkflowTransport};
//!
//! async fn run() -> Result<(), frontand_api::TransportError> {
//!     let client = WorkflowClient::new(Duration::from_secs(30))?;
//!     let response = client
//!         .post_json("https://example.modal.run/process", &serde_json::json!({"prompt": "hi"}))
//!         .await?;
//!     println!("status: {}", response.status);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Hostnames allowed to use plain HTTP, for local development backends.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Errors raised while talking to a workflow endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

/// Successful endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; non-JSON bodies are carried as a JSON string.
    pub body: Value,
}

/// Sends shaped workflow request bodies to a remote endpoint.
#[async_trait]
pub trait WorkflowTransport: Send + Sync {
    /// POST `body` as JSON to `endpoint`.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    http: Client,
    user_agent: String,
}

impl WorkflowClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Client(error.to_string()))?;

        Ok(Self {
            http,
            user_agent: format!("frontand-cli/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        })
    }

    /// Build a request carrying the client's User-Agent.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%url, %method, "building request");
        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Probe the backend serving `endpoint` by requesting its root path.
    ///
    /// Workflow backends answer `GET /` with a small status document such as
    /// `{"status": "healthy", "app": "...", "version": "1.0", "modes": [...]}`.
    pub async fn health(&self, endpoint: &str) -> Result<Value, TransportError> {
        let url = validate_endpoint(endpoint)?;
        let root = url
            .join("/")
            .map_err(|error| TransportError::invalid_endpoint(endpoint, error.to_string()))?;
        let response = self.send(self.request(Method::GET, root)).await?;
        Ok(response.body)
    }

    /// Download an image produced by a workflow and write it to `destination`.
    ///
    /// Returns the number of bytes written.
    pub async fn download_image(&self, image_url: &str, destination: &Path) -> Result<u64, TransportError> {
        let url = Url::parse(image_url).map_err(|error| TransportError::invalid_endpoint(image_url, error.to_string()))?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| TransportError::Io {
                path: destination.to_path_buf(),
                source,
            })?;
        Ok(bytes.len() as u64)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<TransportResponse, TransportError> {
        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;
        Ok(TransportResponse {
            status: status.as_u16(),
            body: parse_response_json(&text),
        })
    }
}

#[async_trait]
impl WorkflowTransport for WorkflowClient {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        let url = validate_endpoint(endpoint)?;
        let builder = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        self.send(builder).await
    }
}

/// Validate that an endpoint is acceptable for posting workflow data.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any http(s) scheme is allowed
/// - otherwise: the scheme must be HTTPS
pub fn validate_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let url = Url::parse(endpoint.trim()).map_err(|error| TransportError::invalid_endpoint(endpoint, error.to_string()))?;

    let host_name = url
        .host_str()
        .ok_or_else(|| TransportError::invalid_endpoint(endpoint, "endpoint must include a host"))?;

    let is_local = LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed));

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_local => Ok(url),
        scheme => Err(TransportError::invalid_endpoint(
            endpoint,
            format!("endpoint must use https for non-localhost hosts; got '{}://'", scheme),
        )),
    }
}

/// Parse response text as JSON, keeping non-JSON text as a JSON string.
pub fn parse_response_json(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(text.to_string()))
}
