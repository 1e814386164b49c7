//! `_source` filtering.
//!
//! The value is threaded through to the document untouched; the compiler never
//! interprets it.

use serde::{Deserialize, Serialize};

/// Controls how the `_source` field is returned with every hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceFilter {
    /// `false` disables `_source`, `true` returns it whole.
    Enabled(bool),
    /// A single wildcard pattern, e.g. `"obj.*"`.
    Pattern(String),
    /// Several wildcard patterns.
    Patterns(Vec<String>),
    /// Explicit include and exclude lists.
    Filter {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        includes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        excludes: Vec<String>,
    },
}

impl SourceFilter {
    /// Build an include/exclude filter.
    pub fn filter<I, E>(includes: I, excludes: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self::Filter {
            includes: includes.into_iter().map(Into::into).collect(),
            excludes: excludes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<bool> for SourceFilter {
    fn from(enabled: bool) -> Self {
        Self::Enabled(enabled)
    }
}

impl From<&str> for SourceFilter {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<Vec<String>> for SourceFilter {
    fn from(patterns: Vec<String>) -> Self {
        Self::Patterns(patterns)
    }
}
