//! Typed REST client for the clinic backend
//!
//! Thin wrappers over the externally defined JSON API: authentication,
//! agenda (appointment) CRUD and expediente (case file) CRUD. Every call is
//! a single best-effort request with a configured timeout; there is no retry
//! or backoff. All requests beyond login attach the bearer token as an
//! `Authorization` header.

mod agenda;
mod auth;
pub mod dto;
mod error;
mod expedientes;

pub use auth::LoginOutcome;
pub use error::ApiError;

use crate::config::BackendConfig;
use reqwest::Client;

/// HTTP client for the clinic backend
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from the backend configuration
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token for authenticated calls
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::MissingToken)
    }

    /// Map a transport-level failure into the client's error taxonomy
    fn transport_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Network(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Turn a non-2xx response into `Rejected`, capturing the body text
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "Backend rejected request");
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
