//! Clauses and the per-category accumulators that hold them.
//!
//! A [`Clause`] is a single operator-tagged condition such as
//! `{"term": {"Level": 5}}`. A [`ClauseSet`] keeps one ordered sequence per
//! boolean category and folds the derived categories into `filter` when the
//! query is compiled.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::errors::QueryError;
use esql_shared::{Setting, Settings};

/// One operator-tagged query condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    operator: &'static str,
    body: Value,
}

impl Clause {
    /// Create a clause from an operator and its full body.
    pub fn new(operator: &'static str, body: impl Into<Value>) -> Self {
        Self {
            operator,
            body: body.into(),
        }
    }

    /// Create a field-keyed clause, e.g. `{"term": {"Level": 5}}`.
    pub fn field(operator: &'static str, field: impl Into<String>, value: Value) -> Self {
        let mut body = Map::new();
        body.insert(field.into(), value);
        Self::new(operator, body)
    }

    /// The operator name.
    pub fn operator(&self) -> &'static str {
        self.operator
    }

    /// The operator's body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Encode as the single-key JSON object the engine expects.
    pub fn to_value(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(self.operator.to_string(), self.body.clone());
        Value::Object(clause)
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.operator, &self.body)?;
        map.end()
    }
}

/// The sequence a clause is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Must,
    Should,
    MustNot,
    Filter,
    Term,
    Terms,
    Range,
    /// `must` of the nested filter bool.
    FilterMust,
    /// `should` of the nested filter bool.
    FilterShould,
    /// `must_not` of the nested filter bool.
    FilterMustNot,
}

impl Category {
    /// Where a negated setting lands when it is handed to this category.
    pub fn negated(self) -> Self {
        match self {
            Self::FilterMust | Self::FilterShould | Self::FilterMustNot => Self::FilterMustNot,
            _ => Self::MustNot,
        }
    }
}

/// How an accumulator turns one setting into clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// One clause per field entry: `{"Name": "a", "Age": 3}` gives two clauses.
    PerField,
    /// The whole mapping is the operator's body.
    Whole,
}

/// The `must`/`should`/`must_not` sequences of a nested bool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolClauses {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl BoolClauses {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// `{"bool": {...}}`, keeping only non-empty sequences.
    pub fn to_clause(&self) -> Clause {
        let mut node = Map::new();
        insert_sequence(&mut node, "must", &self.must);
        insert_sequence(&mut node, "must_not", &self.must_not);
        insert_sequence(&mut node, "should", &self.should);
        Clause::new("bool", node)
    }
}

/// Ordered clause accumulators for every category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSet {
    must: Vec<Clause>,
    should: Vec<Clause>,
    must_not: Vec<Clause>,
    filter: Vec<Clause>,
    term: Vec<Clause>,
    terms: Vec<Clause>,
    range: Vec<Clause>,
    filter_bool: BoolClauses,
}

impl ClauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause to a category.
    pub fn push(&mut self, category: Category, clause: Clause) {
        self.sequence_mut(category).push(clause);
    }

    /// Clauses of one category in insertion order.
    pub fn get(&self, category: Category) -> &[Clause] {
        match category {
            Category::Must => &self.must,
            Category::Should => &self.should,
            Category::MustNot => &self.must_not,
            Category::Filter => &self.filter,
            Category::Term => &self.term,
            Category::Terms => &self.terms,
            Category::Range => &self.range,
            Category::FilterMust => &self.filter_bool.must,
            Category::FilterShould => &self.filter_bool.should,
            Category::FilterMustNot => &self.filter_bool.must_not,
        }
    }

    pub fn must(&self) -> &[Clause] {
        &self.must
    }

    pub fn should(&self) -> &[Clause] {
        &self.should
    }

    pub fn must_not(&self) -> &[Clause] {
        &self.must_not
    }

    /// Whether no clause of any category was accumulated.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
            && self.term.is_empty()
            && self.terms.is_empty()
            && self.range.is_empty()
            && self.filter_bool.is_empty()
    }

    /// The filter sequence after folding: explicit filters, then `term`,
    /// `terms` and `range` clauses, then the nested filter bool if populated.
    pub fn folded_filter(&self) -> Vec<Clause> {
        let mut folded: Vec<Clause> = self
            .filter
            .iter()
            .chain(&self.term)
            .chain(&self.terms)
            .chain(&self.range)
            .cloned()
            .collect();

        if !self.filter_bool.is_empty() {
            folded.push(self.filter_bool.to_clause());
        }

        folded
    }

    fn sequence_mut(&mut self, category: Category) -> &mut Vec<Clause> {
        match category {
            Category::Must => &mut self.must,
            Category::Should => &mut self.should,
            Category::MustNot => &mut self.must_not,
            Category::Filter => &mut self.filter,
            Category::Term => &mut self.term,
            Category::Terms => &mut self.terms,
            Category::Range => &mut self.range,
            Category::FilterMust => &mut self.filter_bool.must,
            Category::FilterShould => &mut self.filter_bool.should,
            Category::FilterMustNot => &mut self.filter_bool.must_not,
        }
    }
}

/// Insert `key: [clauses]` unless the sequence is empty.
pub(crate) fn insert_sequence(node: &mut Settings, key: &str, clauses: &[Clause]) {
    if !clauses.is_empty() {
        let values = clauses.iter().map(Clause::to_value).collect();
        node.insert(key.to_string(), Value::Array(values));
    }
}

/// Read a setting payload as a field mapping.
///
/// `null` is accepted as an empty mapping so optional settings can be passed
/// as `Value::Null`.
pub(crate) fn expect_settings(value: Value, context: &str) -> Result<Settings, QueryError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Settings::new()),
        other => Err(QueryError::invalid_clause(format!(
            "{} expects a field mapping, got {}",
            context,
            kind_of(&other)
        ))),
    }
}

/// Turn settings into clauses, validating every input before any is returned.
///
/// Each entry carries whether it was negated so the caller can route it.
pub(crate) fn build_clauses<I>(
    operator: &'static str,
    shape: Shape,
    settings: I,
) -> Result<Vec<(bool, Clause)>, QueryError>
where
    I: IntoIterator,
    I::Item: Into<Setting>,
{
    let mut clauses = Vec::new();

    for setting in settings {
        let setting = setting.into();
        let negated = setting.is_negated();
        let map = match setting.into_value() {
            Value::Object(map) => map,
            other => {
                return Err(QueryError::invalid_clause(format!(
                    "{} expects a field mapping, got {}",
                    operator,
                    kind_of(&other)
                )))
            }
        };

        match shape {
            Shape::PerField => clauses.extend(
                map.into_iter()
                    .map(|(field, value)| (negated, Clause::field(operator, field, value))),
            ),
            Shape::Whole => clauses.push((negated, Clause::new(operator, map))),
        }
    }

    Ok(clauses)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
