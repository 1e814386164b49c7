//! Error types for mapping inference.

mod schema_error;

pub use schema_error::SchemaError;
