//! # Esql Repository
//!
//! This crate runs compiled esql queries against the search engine. It
//! includes definitions for errors, the transport interface, per-request
//! sessions and a concrete transport for OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod session;
pub mod types;

pub use client::EsqlClient;
pub use config::ClientConfig;
pub use errors::SearchError;
pub use interfaces::Transport;
pub use opensearch::OpenSearchTransport;
pub use session::Session;
pub use types::{
    Acknowledgement, Document, Hit, Hits, IndexInfo, Method, SearchResponse, TransportRequest,
    TransportResponse, WriteResult,
};

pub use esql_query::{JoinKind, QueryBuilder, QueryError, Setting, SourceFilter};
pub use esql_schema::{FieldDescriptor, FieldKind, Mappable, RecordDescriptor, SchemaError};
