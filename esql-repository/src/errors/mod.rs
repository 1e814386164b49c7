//! Error types for the esql repository.

mod search_error;

pub use search_error::SearchError;
