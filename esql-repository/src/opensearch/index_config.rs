//! Index settings and index-name rules.
//!
//! This module defines the settings applied when a session creates an index
//! and the naming rules checked before any index-level request is sent.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::errors::SearchError;

/// Longest index name the engine accepts, in bytes.
pub const MAX_INDEX_NAME_BYTES: usize = 255;

static INDEX_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn index_name_regex() -> &'static Regex {
    INDEX_NAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9._+-]*$").expect("index name pattern"))
}

/// Get the settings used when an index is created without explicit ones.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn default_index_settings() -> Value {
    json!({
        "settings": {
            "index": {
                "number_of_shards": 1,
                "number_of_replicas": 1
            }
        }
    })
}

/// Check an index name against the engine's naming rules: lowercase, no
/// leading `-`, `_` or `+`, not `.` or `..`, at most 255 bytes.
pub fn validate_index_name(name: &str) -> Result<(), SearchError> {
    let valid = name.len() <= MAX_INDEX_NAME_BYTES
        && name != "."
        && name != ".."
        && index_name_regex().is_match(name);

    if valid {
        Ok(())
    } else {
        Err(SearchError::invalid_index_name(name))
    }
}
