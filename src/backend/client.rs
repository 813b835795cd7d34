/// Backend query service client implementation.
///
/// This module provides `BackendClient` for making synchronous HTTP requests to the
/// RAG backend, along with error types and the builder used to configure it.
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::answer::{QueryRequest, QueryResponse};

/// Base URL used when neither the builder nor `KNOWRN_BACKEND_URL` sets one.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

const BACKEND_URL_ENV: &str = "KNOWRN_BACKEND_URL";
const TIMEOUT_ENV: &str = "KNOWRN_TIMEOUT_SECS";

/// Errors that can occur when talking to the backend query service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-related errors (connection refused, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The configured request timeout elapsed
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The response body was not the expected JSON shape
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid timeout configuration error
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// The worker thread for a request could not be started
    #[error("Failed to start request worker: {0}")]
    Worker(#[source] std::io::Error),
}

impl BackendError {
    /// Classifies a transport error from reqwest.
    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Builder for constructing `BackendClient` instances.
///
/// # Examples
///
/// ```
/// use knowrn::backend::BackendClientBuilder;
///
/// let client = BackendClientBuilder::new()
///     .base_url("http://127.0.0.1:8000")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.query_url(), "http://127.0.0.1:8000/query");
/// ```
#[derive(Debug, Default)]
pub struct BackendClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl BackendClientBuilder {
    /// Creates a new `BackendClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the backend (e.g. "http://127.0.0.1:8000").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a whole-request timeout; `Duration::ZERO` disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `BackendClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, `KNOWRN_BACKEND_URL` is used, falling back to
    /// `http://127.0.0.1:8000`.
    ///
    /// If `timeout()` was not called, `KNOWRN_TIMEOUT_SECS` is used. When that is unset
    /// or `0`, requests have no timeout and wait for the backend indefinitely.
    pub fn build(self) -> Result<BackendClient, BackendError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var(BACKEND_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = match self.timeout {
            Some(timeout) => (!timeout.is_zero()).then_some(timeout),
            None => timeout_from_env()?,
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // The blocking client defaults to a 30s timeout; pass ours explicitly so
        // `None` really means no timeout.
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Network)?;

        debug!(%base_url, ?timeout, "backend client configured");

        Ok(BackendClient {
            client,
            base_url,
            timeout,
        })
    }
}

/// Reads `KNOWRN_TIMEOUT_SECS`; unset or zero means no timeout.
fn timeout_from_env() -> Result<Option<Duration>, BackendError> {
    match std::env::var(TIMEOUT_ENV) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| BackendError::InvalidTimeout(format!("{TIMEOUT_ENV}={raw}")))?;
            Ok((secs > 0).then(|| Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

/// Synchronous HTTP client for the backend query service.
///
/// It should be constructed using `BackendClientBuilder`. Requests are sent once;
/// there is no retry.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Option<Duration>,
}

/// Transport used by a session to ask the backend a question.
///
/// This trait enables mocking in unit tests and lets the session stay
/// independent of HTTP.
pub trait QueryTransport: Send + Sync {
    /// Sends `question` to the backend and returns its parsed response.
    fn query(&self, question: &str) -> Result<QueryResponse, BackendError>;
}

impl BackendClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL questions are posted to.
    pub fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    /// Returns the request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Checks that the backend is up by calling its root route.
    ///
    /// Any 2xx answer counts as up. Returns the backend's status `message`, or an
    /// empty string if the body carries none or is not JSON.
    pub fn health(&self) -> Result<String, BackendError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(BackendError::from_transport)?;
        let message = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => json
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                debug!(error = %e, "health response is not JSON");
                String::new()
            }
        };
        Ok(message)
    }

    fn query_internal(&self, question: &str) -> Result<QueryResponse, BackendError> {
        let url = self.query_url();
        debug!(%url, "posting question");

        // `.json()` sets `Content-Type: application/json`.
        let response = self
            .client
            .post(&url)
            .json(&QueryRequest::new(question))
            .send()
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(BackendError::from_transport)?;
        serde_json::from_str(&body).map_err(BackendError::Serialization)
    }
}

impl QueryTransport for BackendClient {
    fn query(&self, question: &str) -> Result<QueryResponse, BackendError> {
        self.query_internal(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::error::Error;

    fn clear_env() {
        unsafe {
            std::env::remove_var(BACKEND_URL_ENV);
            std::env::remove_var(TIMEOUT_ENV);
        }
    }

    #[test]
    fn network_error_variant_display() {
        let reqwest_error = reqwest::blocking::Client::new()
            .get("not-a-valid-url")
            .build()
            .unwrap_err();
        let error = BackendError::Network(reqwest_error);

        assert!(error.to_string().contains("Network error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn http_error_variant_with_status_code() {
        let error = BackendError::Http { status: 503 };
        let msg = error.to_string();
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn serialization_error_chains_source() {
        let json_error = serde_json::from_str::<QueryResponse>("not json").unwrap_err();
        let error = BackendError::Serialization(json_error);
        assert!(error.to_string().contains("Serialization error"));
        assert!(error.source().is_some());
    }

    #[test]
    #[serial]
    fn build_uses_default_url_when_nothing_configured() {
        clear_env();

        let client = BackendClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BACKEND_URL);
        assert_eq!(client.query_url(), "http://127.0.0.1:8000/query");
        assert_eq!(client.timeout(), None);
    }

    #[test]
    #[serial]
    fn build_reads_backend_url_environment_variable() {
        clear_env();
        unsafe {
            std::env::set_var(BACKEND_URL_ENV, "http://rag-host:9000");
        }

        let client = BackendClientBuilder::new().build().unwrap();
        assert_eq!(client.query_url(), "http://rag-host:9000/query");

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_url_takes_precedence_over_environment() {
        clear_env();
        unsafe {
            std::env::set_var(BACKEND_URL_ENV, "http://env-host:9000");
        }

        let client = BackendClientBuilder::new()
            .base_url("http://builder-host:8000")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://builder-host:8000");

        clear_env();
    }

    #[test]
    #[serial]
    fn trailing_slash_is_trimmed() {
        clear_env();
        let client = BackendClientBuilder::new()
            .base_url("http://localhost:8000/")
            .build()
            .unwrap();
        assert_eq!(client.query_url(), "http://localhost:8000/query");
    }

    #[test]
    #[serial]
    fn build_returns_error_if_invalid_url_provided() {
        clear_env();
        let result = BackendClientBuilder::new()
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(BackendError::InvalidUrl(_))));
    }

    #[test]
    #[serial]
    fn timeout_read_from_environment() {
        clear_env();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "15");
        }

        let client = BackendClientBuilder::new().build().unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(15)));

        clear_env();
    }

    #[test]
    #[serial]
    fn zero_timeout_means_none() {
        clear_env();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "0");
        }

        let client = BackendClientBuilder::new().build().unwrap();
        assert_eq!(client.timeout(), None);

        clear_env();
    }

    #[test]
    #[serial]
    fn unparsable_timeout_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "soon");
        }

        let result = BackendClientBuilder::new().build();
        assert!(matches!(result, Err(BackendError::InvalidTimeout(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_timeout_takes_precedence_over_environment() {
        clear_env();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "soon");
        }

        let client = BackendClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(3)));

        clear_env();
    }

    #[test]
    #[serial]
    fn zero_builder_timeout_disables_environment_timeout() {
        clear_env();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "15");
        }

        let client = BackendClientBuilder::new()
            .timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(client.timeout(), None);

        clear_env();
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockTransport;

        impl QueryTransport for MockTransport {
            fn query(&self, question: &str) -> Result<QueryResponse, BackendError> {
                Ok(QueryResponse {
                    answer: Some(format!("echo: {question}")),
                    ..QueryResponse::default()
                })
            }
        }

        let response = MockTransport.query("hi").unwrap();
        assert_eq!(response.answer.as_deref(), Some("echo: hi"));
    }

    #[test]
    #[serial]
    fn unreachable_backend_is_a_network_error() {
        clear_env();
        let client = BackendClientBuilder::new()
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();

        let result = client.query("anyone there?");
        assert!(matches!(result, Err(BackendError::Network(_))));
    }
}
