//! HTTP client utilities.

use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Browser-like user agent for sites that reject library clients
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client with the configured timeouts and the crate user agent
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        Self::build(
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            config,
        )
    }

    /// Create a client with a custom user agent
    pub fn with_user_agent(user_agent: &str, config: &HttpConfig) -> Result<Self, SourceError> {
        Self::build(user_agent, config)
    }

    fn build(user_agent: &str, config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_config() {
        let config = HttpConfig {
            timeout_seconds: 5,
            connect_timeout_seconds: 1,
            lookup_timeout_seconds: 10,
        };
        assert!(HttpClient::from_config(&config).is_ok());
        assert!(HttpClient::with_user_agent(BROWSER_USER_AGENT, &config).is_ok());
    }
}
