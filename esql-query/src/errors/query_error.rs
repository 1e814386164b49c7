//! Query error types.
//!
//! This module defines the errors a builder session can latch while clauses are
//! accumulated or compiled.

use thiserror::Error;

/// Errors that can occur while building or compiling a query document.
///
/// The first error raised in a session is latched: later accumulator calls
/// become no-ops and compiling returns that error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// An accumulator argument could not be read as a field mapping.
    #[error("Invalid clause: {0}")]
    InvalidClauseError(String),

    /// A metric referenced a group aggregation that was never registered.
    #[error("Unknown group: metrics on {0}, but it does not exist")]
    UnknownGroupError(String),

    /// The session was already compiled and is locked.
    #[error("Query already compiled: make-query runs once per session")]
    AlreadyCompiledError,

    /// Encoding the document failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl QueryError {
    /// Create an invalid clause error.
    pub fn invalid_clause(msg: impl Into<String>) -> Self {
        Self::InvalidClauseError(msg.into())
    }

    /// Create an unknown group error.
    pub fn unknown_group(group: impl Into<String>) -> Self {
        Self::UnknownGroupError(group.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
