//! Mapping document inference.

use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::{FieldDescriptor, FieldKind, Mappable, RecordDescriptor};
use crate::errors::SchemaError;
use crate::tags::{parse_tags, Tags};

/// Build `{"properties": {...}}` for a record.
///
/// # Arguments
///
/// * `record` - The record description
///
/// # Returns
///
/// * `Ok(Value)` - The mapping document body
/// * `Err(SchemaError)` - A malformed tag or a record without fields
pub fn infer_mapping(record: &RecordDescriptor) -> Result<Value, SchemaError> {
    let mut mapping = Map::new();
    mapping.insert("properties".to_string(), Value::Object(properties(record)?));
    Ok(Value::Object(mapping))
}

/// [`infer_mapping`] for a [`Mappable`] type.
pub fn mapping_for<T: Mappable>() -> Result<Value, SchemaError> {
    infer_mapping(&T::descriptor())
}

fn properties(record: &RecordDescriptor) -> Result<Map<String, Value>, SchemaError> {
    if record.fields().is_empty() {
        return Err(SchemaError::empty_record(record.name()));
    }

    let mut properties = Map::new();
    for field in record.fields() {
        properties.insert(field.name().to_string(), field_mapping(field)?);
    }
    Ok(properties)
}

fn field_mapping(field: &FieldDescriptor) -> Result<Value, SchemaError> {
    let overrides = match field.tag_str() {
        Some(tags) => match parse_tags(field.name(), tags)? {
            Tags::Excluded => {
                debug!(field = %field.name(), "Field excluded from mapping");
                let mut disabled = Map::new();
                disabled.insert("enabled".to_string(), Value::Bool(false));
                return Ok(Value::Object(disabled));
            }
            Tags::Settings(settings) => settings,
        },
        None => Map::new(),
    };

    let mut mapping = Map::new();
    match field.kind() {
        FieldKind::Object(record) => {
            mapping.insert("properties".to_string(), Value::Object(properties(record)?));
        }
        FieldKind::Array(element) => match element.as_ref() {
            FieldKind::Object(record) => {
                mapping.insert("type".to_string(), Value::String("object".to_string()));
                mapping.insert("properties".to_string(), Value::Object(properties(record)?));
            }
            scalar => insert_default_type(&mut mapping, scalar),
        },
        scalar => insert_default_type(&mut mapping, scalar),
    }

    mapping.extend(overrides);
    Ok(Value::Object(mapping))
}

fn insert_default_type(mapping: &mut Map<String, Value>, kind: &FieldKind) {
    if let Some(default) = kind.default_type() {
        mapping.insert("type".to_string(), Value::String(default.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Employee;

    impl Mappable for Employee {
        fn descriptor() -> RecordDescriptor {
            RecordDescriptor::new("Employee")
                .field(FieldDescriptor::new("Name", FieldKind::Keyword))
                .field(FieldDescriptor::new("Age", FieldKind::Integer).tags("type:short"))
                .field(
                    FieldDescriptor::new("JoinDate", FieldKind::Date)
                        .tags("format:yyyy-MM-dd;ignore_malformed:true"),
                )
                .field(FieldDescriptor::new("Secret", FieldKind::Text).tags("-"))
        }
    }

    fn address() -> RecordDescriptor {
        RecordDescriptor::new("Address")
            .field(FieldDescriptor::new("City", FieldKind::Keyword))
            .field(FieldDescriptor::new("Location", FieldKind::GeoPoint))
    }

    #[test]
    fn test_scalar_fields() {
        assert_eq!(
            mapping_for::<Employee>().unwrap(),
            json!({
                "properties": {
                    "Name": { "type": "keyword" },
                    "Age": { "type": "short" },
                    "JoinDate": { "type": "date", "format": "yyyy-MM-dd", "ignore_malformed": true },
                    "Secret": { "enabled": false }
                }
            })
        );
    }

    #[test]
    fn test_nested_record() {
        let record = RecordDescriptor::new("Person")
            .field(FieldDescriptor::new("Home", FieldKind::Object(address())));

        assert_eq!(
            infer_mapping(&record).unwrap(),
            json!({
                "properties": {
                    "Home": {
                        "properties": {
                            "City": { "type": "keyword" },
                            "Location": { "type": "geo_point" }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_array_of_records() {
        let record = RecordDescriptor::new("Person")
            .field(FieldDescriptor::new(
                "Visits",
                FieldKind::array_of(FieldKind::Object(address())),
            ))
            .field(
                FieldDescriptor::new("Homes", FieldKind::array_of(FieldKind::Object(address())))
                    .tags("type:nested"),
            );

        let mapping = infer_mapping(&record).unwrap();

        assert_eq!(mapping["properties"]["Visits"]["type"], "object");
        assert_eq!(mapping["properties"]["Homes"]["type"], "nested");
        assert_eq!(
            mapping["properties"]["Homes"]["properties"]["City"],
            json!({ "type": "keyword" })
        );
    }

    #[test]
    fn test_array_of_scalars() {
        let record = RecordDescriptor::new("Post")
            .field(FieldDescriptor::new("Tags", FieldKind::array_of(FieldKind::Keyword)))
            .field(
                FieldDescriptor::new("Title", FieldKind::Text)
                    .tags("analyzer:english;fields:raw,keyword"),
            );

        assert_eq!(
            infer_mapping(&record).unwrap(),
            json!({
                "properties": {
                    "Tags": { "type": "keyword" },
                    "Title": {
                        "type": "text",
                        "analyzer": "english",
                        "fields": { "raw": { "type": "keyword" } }
                    }
                }
            })
        );
    }

    #[test]
    fn test_invalid_tag() {
        let record = RecordDescriptor::new("Post")
            .field(FieldDescriptor::new("Title", FieldKind::Text).tags("analyzer"));

        assert!(matches!(
            infer_mapping(&record),
            Err(SchemaError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_empty_record() {
        let record = RecordDescriptor::new("Person")
            .field(FieldDescriptor::new("Home", FieldKind::Object(RecordDescriptor::new("Empty"))));

        assert_eq!(
            infer_mapping(&record),
            Err(SchemaError::EmptyRecord("Empty".to_string()))
        );
    }
}
