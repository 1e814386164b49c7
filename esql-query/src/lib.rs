//! # Esql Query
//!
//! This crate accumulates query clauses, bool modifiers, join wrappers and
//! aggregations into a [`QueryBuilder`] session, and compiles them once into a
//! search document string.
//!
//! The crate performs no I/O. The transport layer in `esql-repository` sends
//! the compiled template to the engine.

mod aggregate;
pub mod aggregation;
pub mod builder;
pub mod clause;
mod compiler;
pub mod errors;
pub mod join;

pub use aggregation::{
    AggregationNode, AggregationTree, GroupKind, GroupNode, MetricKind, MetricNode, MetricScope,
    ALL_DOCUMENTS,
};
pub use builder::QueryBuilder;
pub use clause::{Category, Clause, ClauseSet};
pub use errors::QueryError;
pub use join::{Join, JoinKind};

pub use esql_shared::{Pagination, Setting, Settings, SourceFilter};
