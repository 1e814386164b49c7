//! # Esql Schema
//!
//! This crate infers index mapping documents from declarative record
//! descriptions. Field names are used verbatim, so they match the field names
//! used in query clauses.

pub mod descriptor;
pub mod errors;
pub mod infer;
pub mod tags;

pub use descriptor::{FieldDescriptor, FieldKind, Mappable, RecordDescriptor};
pub use errors::SchemaError;
pub use infer::{infer_mapping, mapping_for};
