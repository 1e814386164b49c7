//! OpenSearch transport implementation.
//!
//! This module provides the concrete implementation of `Transport` using the
//! OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::{
        headers::HeaderMap,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method as HttpMethod,
    },
    OpenSearch,
};
use tracing::{debug, error, info, instrument};

use crate::config::ClientConfig;
use crate::errors::SearchError;
use crate::interfaces::Transport;
use crate::types::{Method, TransportRequest, TransportResponse};

/// OpenSearch transport.
///
/// Sends raw requests to a single node. Works against OpenSearch and
/// Elasticsearch endpoints alike since only generic REST paths are used.
///
/// # Example
///
/// ```ignore
/// use esql_repository::{ClientConfig, EsqlClient, OpenSearchTransport};
///
/// let config = ClientConfig::from_env()?;
/// let transport = OpenSearchTransport::new(&config)?;
/// let client = EsqlClient::with_config(Box::new(transport), config);
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
}

impl OpenSearchTransport {
    /// Create a new transport connected to the configured endpoint.
    ///
    /// # Arguments
    ///
    /// * `config` - The client configuration holding the endpoint and request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport instance
    /// * `Err(SearchError)` - If connection setup fails
    pub fn new(config: &ClientConfig) -> Result<Self, SearchError> {
        let conn_pool = SingleNodeConnectionPool::new(config.endpoint.clone());
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            endpoint = %config.endpoint,
            request_timeout = ?config.request_timeout,
            "Created OpenSearch transport"
        );

        Ok(Self { client })
    }

    fn http_method(method: Method) -> HttpMethod {
        match method {
            Method::Get => HttpMethod::Get,
            Method::Head => HttpMethod::Head,
            Method::Post => HttpMethod::Post,
            Method::Put => HttpMethod::Put,
            Method::Delete => HttpMethod::Delete,
        }
    }
}

#[async_trait]
impl Transport for OpenSearchTransport {
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, SearchError> {
        let query = (!request.query.is_empty()).then_some(&request.query);

        let response = self
            .client
            .send(
                Self::http_method(request.method),
                &request.path,
                HeaderMap::new(),
                query,
                request.body.clone(),
                None,
            )
            .await
            .map_err(|e| SearchError::request(e.to_string()))?;

        let status = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::request(e.to_string()))?;

        if status >= 400 {
            error!(status = status, body = %body, "Request failed");
        } else {
            debug!(status = status, bytes = body.len(), "Request completed");
        }

        Ok(TransportResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert!(matches!(
            OpenSearchTransport::http_method(Method::Head),
            HttpMethod::Head
        ));
        assert!(matches!(
            OpenSearchTransport::http_method(Method::Post),
            HttpMethod::Post
        ));
    }

    #[test]
    fn test_new_from_default_config() {
        let transport = OpenSearchTransport::new(&ClientConfig::default());

        assert!(transport.is_ok());
    }
}
