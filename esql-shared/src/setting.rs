//! Clause settings.
//!
//! A [`Setting`] is one field-to-settings mapping handed to an accumulator.
//! Whether it constrains positively or negatively is decided by the variant the
//! caller builds, never by inspecting the payload.

use serde_json::{Map, Value};

/// Field-to-value mapping. Keys iterate in alphabetical order, which is also the
/// order in which they are encoded.
pub type Settings = Map<String, Value>;

/// A field-settings mapping tagged with its polarity.
///
/// `Negated` settings are routed to `must_not` by every accumulator, so a single
/// call can mix positive and negated constraints:
///
/// ```ignore
/// builder.term([
///     Setting::positive(json!({ "Number": 1 })),
///     Setting::negated(json!({ "Level": 2 })),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// The clause must hold.
    Positive(Value),
    /// The clause must not hold.
    Negated(Value),
}

impl Setting {
    /// Create a positive setting.
    pub fn positive(value: impl Into<Value>) -> Self {
        Self::Positive(value.into())
    }

    /// Create a negated setting.
    pub fn negated(value: impl Into<Value>) -> Self {
        Self::Negated(value.into())
    }

    /// Whether this setting is routed to `must_not`.
    pub fn is_negated(&self) -> bool {
        matches!(self, Self::Negated(_))
    }

    /// Borrow the raw payload.
    pub fn value(&self) -> &Value {
        match self {
            Self::Positive(value) | Self::Negated(value) => value,
        }
    }

    /// Take the payload, dropping the polarity.
    pub fn into_value(self) -> Value {
        match self {
            Self::Positive(value) | Self::Negated(value) => value,
        }
    }

    /// Return a setting with the same payload and negated polarity.
    pub fn negate(self) -> Self {
        Self::Negated(self.into_value())
    }
}

impl From<Value> for Setting {
    fn from(value: Value) -> Self {
        Self::Positive(value)
    }
}

impl From<Settings> for Setting {
    fn from(settings: Settings) -> Self {
        Self::Positive(Value::Object(settings))
    }
}
