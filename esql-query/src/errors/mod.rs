//! Error types for query compilation.

mod query_error;

pub use query_error::QueryError;
