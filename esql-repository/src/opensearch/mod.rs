//! OpenSearch implementation of the transport.
//!
//! This module provides a concrete implementation of `Transport` using
//! OpenSearch as the backend, plus the index-level defaults sessions apply.

mod client;
pub mod index_config;

pub use client::OpenSearchTransport;
pub use index_config::{default_index_settings, validate_index_name};
