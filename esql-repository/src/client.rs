//! Esql client implementation.
//!
//! This module provides the main client for talking to the search engine.
//! Application code opens one [`Session`] per logical request with
//! [`EsqlClient::db`], builds the query on it and runs one endpoint.

use tracing::instrument;

use crate::config::ClientConfig;
use crate::errors::SearchError;
use crate::interfaces::Transport;
use crate::session::{check_status, Session};
use crate::types::{IndexInfo, Method, TransportRequest};

/// The main client for interacting with the search engine.
///
/// The client holds only read-only state, so it can be shared across tasks
/// while every session keeps its own builder.
pub struct EsqlClient {
    transport: Box<dyn Transport>,
    config: ClientConfig,
}

impl EsqlClient {
    /// Create a new EsqlClient with default configuration.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
        }
    }

    /// Create a new EsqlClient with custom configuration.
    pub fn with_config(transport: Box<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a session on `index`.
    ///
    /// `index` may list several indices (`blog,author`) or use wildcards
    /// (`blog_*`) for searches; an empty string targets every index.
    pub fn db(&self, index: impl Into<String>) -> Session<'_> {
        Session::new(self.transport.as_ref(), index.into(), &self.config.search_timeout)
    }

    /// List the indices of the cluster.
    #[instrument(skip(self))]
    pub async fn cat_indices(&self) -> Result<Vec<IndexInfo>, SearchError> {
        let request = TransportRequest::new(Method::Get, "/_cat/indices").param("format", "json");
        let response = check_status(self.transport.execute(&request).await?)?;
        response.json()
    }
}
