//! Schema error types.

use thiserror::Error;

/// Errors that can occur while inferring a mapping document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field's override tags could not be parsed.
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    /// A record has no fields to map.
    #[error("Empty record: {0} has no fields")]
    EmptyRecord(String),
}

impl SchemaError {
    /// Create an invalid tag error.
    pub fn invalid_tag(msg: impl Into<String>) -> Self {
        Self::InvalidTag(msg.into())
    }

    /// Create an empty record error.
    pub fn empty_record(record: impl Into<String>) -> Self {
        Self::EmptyRecord(record.into())
    }
}
