//! # Esql Shared
//!
//! Plain data types shared by the esql crates: the clause settings carried by
//! every accumulator call, pagination and `_source` filtering.
//!
//! These types carry no behavior beyond construction and conversion.

pub mod pagination;
pub mod setting;
pub mod source;

pub use pagination::Pagination;
pub use setting::{Setting, Settings};
pub use source::SourceFilter;
