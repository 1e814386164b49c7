//! Declarative record descriptions.

/// The value kind of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Keyword,
    Integer,
    Double,
    Boolean,
    Date,
    /// Free-form key/value data, mapped as `object`.
    Map,
    GeoPoint,
    /// An embedded record.
    Object(RecordDescriptor),
    /// A list of values; the engine treats every field as multi-valued.
    Array(Box<FieldKind>),
}

impl FieldKind {
    /// `Array(kind)`.
    pub fn array_of(kind: FieldKind) -> Self {
        Self::Array(Box::new(kind))
    }

    /// The mapping type used when no tag overrides it. Records have none.
    pub fn default_type(&self) -> Option<&'static str> {
        match self {
            Self::Text => Some("text"),
            Self::Keyword => Some("keyword"),
            Self::Integer => Some("integer"),
            Self::Double => Some("double"),
            Self::Boolean => Some("boolean"),
            Self::Date => Some("date"),
            Self::Map => Some("object"),
            Self::GeoPoint => Some("geo_point"),
            Self::Object(_) => None,
            Self::Array(element) => element.default_type(),
        }
    }
}

/// One field of a record with its optional override tags.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    tags: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: None,
        }
    }

    /// Attach override tags, e.g. `"type:text;analyzer:english"` or `"-"`.
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn tag_str(&self) -> Option<&str> {
        self.tags.as_deref()
    }
}

/// A named record and its fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Types that can describe themselves for mapping inference.
///
/// ```ignore
/// impl Mappable for Employee {
///     fn descriptor() -> RecordDescriptor {
///         RecordDescriptor::new("Employee")
///             .field(FieldDescriptor::new("Name", FieldKind::Keyword))
///             .field(FieldDescriptor::new("Age", FieldKind::Integer))
///     }
/// }
/// ```
pub trait Mappable {
    fn descriptor() -> RecordDescriptor;
}
