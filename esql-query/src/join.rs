//! Parent/child and nested join wrappers.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::errors::QueryError;
use esql_shared::Settings;

/// The join node wrapping a compiled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `nested`, discriminated by `path`.
    Nested,
    /// `has_parent`, discriminated by `parent_type`.
    HasParent,
    /// `has_child`, discriminated by `type`.
    HasChild,
}

impl JoinKind {
    /// The node name in the query document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nested => "nested",
            Self::HasParent => "has_parent",
            Self::HasChild => "has_child",
        }
    }

    /// The key naming the joined path or type.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Nested => "path",
            Self::HasParent => "parent_type",
            Self::HasChild => "type",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinKind {
    type Err = QueryError;

    /// Accepts `nested`, `parent`/`has_parent` and `child`/`has_child`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nested" => Ok(Self::Nested),
            "parent" | "has_parent" => Ok(Self::HasParent),
            "child" | "has_child" => Ok(Self::HasChild),
            other => Err(QueryError::invalid_clause(format!(
                "unknown join kind '{}', expected nested, has_parent or has_child",
                other
            ))),
        }
    }
}

/// A join wrapper: kind, joined path or type, and extra settings such as
/// `score_mode`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    on: String,
    settings: Settings,
}

impl Join {
    pub fn new(kind: JoinKind, on: impl Into<String>, settings: Settings) -> Self {
        Self {
            kind,
            on: on.into(),
            settings,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Wrap `query` as the `query` member of the join node.
    ///
    /// The discriminator and `query` keys always win over same-named settings.
    pub fn wrap(&self, query: Value) -> Value {
        let mut node = self.settings.clone();
        node.insert(
            self.kind.discriminator().to_string(),
            Value::String(self.on.clone()),
        );
        node.insert("query".to_string(), query);

        let mut wrapper = Map::new();
        wrapper.insert(self.kind.as_str().to_string(), Value::Object(node));
        Value::Object(wrapper)
    }
}
