//! Configuration types for the EsqlClient.

use std::env;
use std::time::Duration;

use url::Url;

use crate::errors::SearchError;

/// Endpoint used when `ELASTICSEARCH_HOST` is not set.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9200";

/// Per-search `timeout` parameter sent with every session request.
pub const DEFAULT_SEARCH_TIMEOUT: &str = "8s";

/// Client-side limit on one request round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the EsqlClient.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the engine.
    pub endpoint: Url,
    /// Value of the `timeout` query parameter, e.g. `8s` or `500ms`.
    pub search_timeout: String,
    /// Transport-level timeout for one request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            search_timeout: DEFAULT_SEARCH_TIMEOUT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given endpoint with default timeouts.
    pub fn new(endpoint: &str) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SearchError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            endpoint,
            ..Self::default()
        })
    }

    /// Read `ELASTICSEARCH_HOST` and `ESQL_SEARCH_TIMEOUT`, falling back to
    /// the defaults for unset variables.
    pub fn from_env() -> Result<Self, SearchError> {
        let endpoint = env::var("ELASTICSEARCH_HOST")
            .ok()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let mut config = Self::new(&endpoint)?;
        if let Some(timeout) = env::var("ESQL_SEARCH_TIMEOUT")
            .ok()
            .filter(|timeout| !timeout.is_empty())
        {
            config.search_timeout = timeout;
        }
        Ok(config)
    }

    /// Set the search `timeout` parameter.
    pub fn with_search_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.search_timeout = timeout.into();
        self
    }

    /// Set the transport-level request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.endpoint.as_str(), "http://localhost:9200/");
        assert_eq!(config.search_timeout, "8s");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = ClientConfig::new("not a url");

        assert!(matches!(result, Err(SearchError::ConfigError(_))));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::new("http://search:9200")
            .unwrap()
            .with_search_timeout("500ms")
            .with_request_timeout(Duration::from_secs(2));

        assert_eq!(config.endpoint.host_str(), Some("search"));
        assert_eq!(config.search_timeout, "500ms");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }
}
