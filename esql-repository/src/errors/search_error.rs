//! Search error types.
//!
//! This module defines the error types that can occur while a session talks to
//! the search engine.

use esql_query::QueryError;
use esql_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or its body could not be read.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The engine answered with a status of 400 or above.
    #[error("Response error: status {status}: {body}")]
    ResponseError { status: u16, body: String },

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The index name breaks the engine's naming rules.
    #[error("Invalid index name: {0}")]
    InvalidIndexName(String),

    /// The document id cannot be addressed in a request path.
    #[error("Invalid document id: {0:?}")]
    InvalidDocumentId(String),

    /// The client configuration could not be built.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// The query builder latched an error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The mapping could not be inferred.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a response error.
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self::ResponseError {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an invalid index name error.
    pub fn invalid_index_name(name: impl Into<String>) -> Self {
        Self::InvalidIndexName(name.into())
    }

    /// Create an invalid document id error.
    pub fn invalid_document_id(id: impl Into<String>) -> Self {
        Self::InvalidDocumentId(id.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The response status, for errors returned by the engine.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ResponseError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
