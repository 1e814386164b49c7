//! Transport trait definition.
//!
//! Sessions hand every request to a [`Transport`]; they never talk HTTP
//! themselves.

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{TransportRequest, TransportResponse};

/// Abstract interface for executing requests against a search engine.
///
/// Implementations can be swapped for different backends (OpenSearch, mock,
/// etc.). A transport returns every response it receives, including error
/// statuses; deciding what a status means is left to the caller.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one client can serve sessions
/// across async tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request.
    ///
    /// # Arguments
    ///
    /// * `request` - Method, path relative to the endpoint, query parameters and
    ///   optional JSON body
    ///
    /// # Returns
    ///
    /// * `Ok(TransportResponse)` - The status and raw body
    /// * `Err(SearchError)` - If the request could not be sent or read
    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, SearchError>;
}
