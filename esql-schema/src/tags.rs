//! Field override tags.
//!
//! A tag string is either `-`, which disables the field, or `;`-separated
//! `key:value` pairs such as `type:text;analyzer:english`. The `fields` key
//! declares a multi-field as `fields:name,type[,analyzer]`.

use serde_json::{Map, Value};

use crate::errors::SchemaError;

/// Tag disabling a field.
pub const EXCLUDED: &str = "-";

/// Parsed tags for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Tags {
    Excluded,
    Settings(Map<String, Value>),
}

/// Parse a tag string.
pub fn parse_tags(field: &str, tags: &str) -> Result<Tags, SchemaError> {
    let tags = tags.trim();
    if tags == EXCLUDED {
        return Ok(Tags::Excluded);
    }

    let mut settings = Map::new();
    for entry in tags.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (key, value) = entry.split_once(':').ok_or_else(|| {
            SchemaError::invalid_tag(format!("{}: '{}' is not a key:value pair", field, entry))
        })?;

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return Err(SchemaError::invalid_tag(format!(
                "{}: '{}' has an empty key or value",
                field, entry
            )));
        }

        if key == "fields" {
            let (name, multi_field) = parse_multi_field(field, value)?;
            let fields = settings
                .entry("fields")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(fields) = fields {
                fields.insert(name, multi_field);
            }
        } else {
            settings.insert(key.to_string(), coerce(value));
        }
    }

    Ok(Tags::Settings(settings))
}

/// `name,type[,analyzer]` into `(name, {"type": .., "analyzer": ..})`.
fn parse_multi_field(field: &str, value: &str) -> Result<(String, Value), SchemaError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();

    let (name, kind, analyzer) = match parts.as_slice() {
        [name, kind] => (*name, *kind, None),
        [name, kind, analyzer] => (*name, *kind, Some(*analyzer)),
        _ => {
            return Err(SchemaError::invalid_tag(format!(
                "{}: fields expects name,type[,analyzer], got '{}'",
                field, value
            )))
        }
    };

    if name.is_empty() || kind.is_empty() {
        return Err(SchemaError::invalid_tag(format!(
            "{}: multi-field '{}' needs a name and a type",
            field, value
        )));
    }

    let mut multi_field = Map::new();
    multi_field.insert("type".to_string(), Value::String(kind.to_string()));

    if let Some(analyzer) = analyzer.filter(|analyzer| !analyzer.is_empty()) {
        if kind != "text" {
            return Err(SchemaError::invalid_tag(format!(
                "{}: analyzer '{}' only applies to text multi-fields, not {}",
                field, analyzer, kind
            )));
        }
        multi_field.insert("analyzer".to_string(), Value::String(analyzer.to_string()));
    }

    Ok((name.to_string(), Value::Object(multi_field)))
}

fn coerce(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}
