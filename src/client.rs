//! HTTP collaborator that serves option lists
//!
//! The trait is the seam for tests and for host applications that already
//! carry an authenticated client; [`HttpOptionsClient`] is the pooled
//! reqwest-backed default.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Upstream source of option lists.
#[async_trait]
pub trait OptionsClient: Send + Sync {
    /// Fetch the response body for `locator`.
    async fn get(&self, locator: &str) -> Result<Value>;
}

/// Default HTTP client with connection pooling.
#[derive(Debug, Clone)]
pub struct HttpOptionsClient {
    base_url: String,
    http_client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpOptionsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("options-loader/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            http_client,
            auth_token: None,
        }
    }

    /// Create a client with custom HTTP client configuration.
    pub fn with_custom_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            auth_token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn endpoint(&self, locator: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            locator.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl OptionsClient for HttpOptionsClient {
    async fn get(&self, locator: &str) -> Result<Value> {
        let url = self.endpoint(locator);

        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .with_context(|| format!("Request to {url} failed"))?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to decode response from {url}"))
    }
}
