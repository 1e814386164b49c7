//! The query builder session.
//!
//! A [`QueryBuilder`] is a two-state machine. While `Building`, accumulator
//! calls append clauses, aggregations and document settings to a draft.
//! [`QueryBuilder::make_query`] compiles the draft once, stores the template and
//! drops the draft; the session is then `Compiled` and locked.
//!
//! Errors are latched: the first error raised wins, later accumulator calls
//! are ignored and `make_query` returns that error without producing a
//! template.
//!
//! # Example
//!
//! ```ignore
//! use esql_query::{JoinKind, QueryBuilder};
//! use serde_json::json;
//!
//! let mut builder = QueryBuilder::new();
//! builder
//!     .joins(JoinKind::Nested, "blog", json!({}))
//!     .must([json!({ "blog.title": "rust" })])
//!     .term([json!({ "blog.published": true })])
//!     .limit_from(3, 4);
//!
//! let template = builder.make_query()?;
//! ```

use serde_json::Value;
use tracing::{debug, warn};

use crate::aggregation::AggregationTree;
use crate::clause::{build_clauses, expect_settings, Category, Clause, ClauseSet, Shape};
use crate::compiler;
use crate::errors::QueryError;
use crate::join::{Join, JoinKind};
use esql_shared::{Pagination, Setting, Settings, SourceFilter};

/// Bool keys owned by the compiler; bool modifiers may not set them.
const RESERVED_BOOL_KEYS: [&str; 4] = ["must", "must_not", "should", "filter"];

/// Everything accumulated while the session is building.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub(crate) clauses: ClauseSet,
    pub(crate) modifiers: Settings,
    pub(crate) dismax: Option<Settings>,
    pub(crate) join: Option<Join>,
    pub(crate) aggregations: AggregationTree,
    pub(crate) sort: Option<Vec<Value>>,
    pub(crate) pagination: Pagination,
    pub(crate) source: Option<SourceFilter>,
}

#[derive(Debug)]
enum State {
    Building(Box<Draft>),
    Compiled(String),
}

/// Accumulates clauses and compiles them into one search document.
#[derive(Debug)]
pub struct QueryBuilder {
    state: State,
    error: Option<QueryError>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Start a new session in the building state.
    pub fn new() -> Self {
        Self {
            state: State::Building(Box::default()),
            error: None,
        }
    }

    /// Discard the draft, template and latched error and start over.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Whether `make_query` has already run.
    pub fn is_compiled(&self) -> bool {
        matches!(self.state, State::Compiled(_))
    }

    /// The compiled template, once `make_query` succeeded.
    pub fn template(&self) -> Option<&str> {
        match &self.state {
            State::Compiled(template) => Some(template),
            State::Building(_) => None,
        }
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// The aggregations registered so far, while building.
    pub fn aggregations(&self) -> Option<&AggregationTree> {
        match &self.state {
            State::Building(draft) => Some(&draft.aggregations),
            State::Compiled(_) => None,
        }
    }

    /// Compile the draft into the template and lock the session.
    ///
    /// # Returns
    ///
    /// * `Ok(&str)` - The compiled template
    /// * `Err(QueryError)` - The latched error, `AlreadyCompiledError` on a
    ///   second call, or a serialization failure
    pub fn make_query(&mut self) -> Result<&str, QueryError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let compiled = match &self.state {
            State::Building(draft) => compiler::compile_document(draft),
            State::Compiled(_) => return Err(QueryError::AlreadyCompiledError),
        };

        let template = match compiled {
            Ok(template) => template,
            Err(error) => {
                self.error = Some(error.clone());
                return Err(error);
            }
        };

        debug!(bytes = template.len(), "Compiled query template");

        // Dropping the draft is what locks the session.
        self.state = State::Compiled(template);
        Ok(self.template().unwrap_or_default())
    }

    /// Run `f` against the draft, latching whatever error it returns.
    ///
    /// `f` must validate before mutating so a failed call leaves the draft
    /// unchanged.
    pub(crate) fn update<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Draft) -> Result<(), QueryError>,
    {
        if self.error.is_some() {
            return self;
        }

        let result = match &mut self.state {
            State::Building(draft) => f(draft.as_mut()),
            State::Compiled(_) => {
                warn!("Accumulator called on a compiled query; the call is rejected");
                Err(QueryError::AlreadyCompiledError)
            }
        };

        if let Err(error) = result {
            debug!(error = %error, "Latched query builder error");
            self.error = Some(error);
        }
        self
    }

    fn push_clauses<I>(
        &mut self,
        operator: &'static str,
        category: Category,
        shape: Shape,
        settings: I,
    ) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.update(|draft| {
            for (negated, clause) in build_clauses(operator, shape, settings)? {
                let target = if negated { category.negated() } else { category };
                draft.clauses.push(target, clause);
            }
            Ok(())
        })
    }

    /// `must` + `match`: `{"match": {"field": value}}`.
    pub fn and_where<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.must(settings)
    }

    /// `should` + `match`.
    pub fn or_where<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.should(settings)
    }

    /// `must_not` + `match`.
    pub fn not_where<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.must_not(settings)
    }

    /// The clause must appear in matching documents and contributes to the score.
    pub fn must<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("match", Category::Must, Shape::PerField, settings)
    }

    /// The clause should appear in matching documents.
    pub fn should<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("match", Category::Should, Shape::PerField, settings)
    }

    /// The clause must not appear in matching documents. Every input is
    /// treated as negated.
    pub fn must_not<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        let negated = settings
            .into_iter()
            .map(|setting| Into::<Setting>::into(setting).negate());
        self.push_clauses("match", Category::MustNot, Shape::PerField, negated)
    }

    /// `filter` + `term`: the clause must match but does not score.
    pub fn filter<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("term", Category::Filter, Shape::PerField, settings)
    }

    /// `should` + `match`, e.g. `{"Name": {"query": "this", "fuzziness": "AUTO"}}`.
    pub fn match_query<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("match", Category::Should, Shape::PerField, settings)
    }

    /// `must` + `match_phrase`.
    pub fn phrase<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("match_phrase", Category::Must, Shape::PerField, settings)
    }

    /// `must` + `query_string`; each setting is one full query body such as
    /// `{"query": "this AND that", "fields": ["Name"]}`.
    pub fn string_query<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("query_string", Category::Must, Shape::Whole, settings)
    }

    /// `must` + `simple_query_string`.
    pub fn simple_string_select<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("simple_query_string", Category::Must, Shape::Whole, settings)
    }

    /// `must` + `multi_match` over `fields`, e.g. `{"query": "rust", "type": "best_fields"}`.
    pub fn multi_match(&mut self, fields: &[&str], setting: impl Into<Setting>) -> &mut Self {
        let setting = setting.into();
        let negated = setting.is_negated();
        let fields: Vec<Value> = fields.iter().map(|field| Value::from(*field)).collect();

        self.update(move |draft| {
            let mut body = expect_settings(setting.into_value(), "multi_match")?;
            body.insert("fields".to_string(), Value::Array(fields));

            let category = if negated { Category::MustNot } else { Category::Must };
            draft.clauses.push(category, Clause::new("multi_match", body));
            Ok(())
        })
    }

    /// `term`: exact value match, folded into `filter`.
    pub fn term<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("term", Category::Term, Shape::PerField, settings)
    }

    /// `terms`: `{field: values}` merged with extra settings such as `boost`.
    pub fn terms<V>(&mut self, field: &str, values: V, setting: impl Into<Setting>) -> &mut Self
    where
        V: IntoIterator,
        V::Item: Into<Value>,
    {
        let setting = setting.into();
        let negated = setting.is_negated();
        let field = field.to_string();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();

        self.update(move |draft| {
            let mut body = expect_settings(setting.into_value(), "terms")?;
            body.insert(field, Value::Array(values));

            let category = if negated { Category::MustNot } else { Category::Terms };
            draft.clauses.push(category, Clause::new("terms", body));
            Ok(())
        })
    }

    /// Same as [`QueryBuilder::terms`].
    pub fn is_in<V>(&mut self, field: &str, values: V, setting: impl Into<Setting>) -> &mut Self
    where
        V: IntoIterator,
        V::Item: Into<Value>,
    {
        self.terms(field, values, setting)
    }

    /// `range`, e.g. `{"Level": {"gt": 1, "lte": 4}}`, folded into `filter`.
    pub fn range<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("range", Category::Range, Shape::PerField, settings)
    }

    /// Same as [`QueryBuilder::range`].
    pub fn between<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.range(settings)
    }

    /// `filter` + `regexp`.
    pub fn regexp<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("regexp", Category::Filter, Shape::PerField, settings)
    }

    /// `filter` + `fuzzy`.
    pub fn fuzzy<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("fuzzy", Category::Filter, Shape::PerField, settings)
    }

    /// `filter` + `wildcard`.
    pub fn wildcard<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("wildcard", Category::Filter, Shape::PerField, settings)
    }

    /// Documents without a value for any of `fields`: `must_not` + `exists`.
    pub fn missing(&mut self, fields: &[&str]) -> &mut Self {
        let clauses = exists_clauses(fields);
        self.update(move |draft| {
            for clause in clauses {
                draft.clauses.push(Category::MustNot, clause);
            }
            Ok(())
        })
    }

    /// Documents with a value for every one of `fields`: `filter` + `exists`.
    pub fn not_nil(&mut self, fields: &[&str]) -> &mut Self {
        let clauses = exists_clauses(fields);
        self.update(move |draft| {
            for clause in clauses {
                draft.clauses.push(Category::Filter, clause);
            }
            Ok(())
        })
    }

    /// `term` clauses in the `must` of the nested filter bool.
    pub fn filter_must<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("term", Category::FilterMust, Shape::PerField, settings)
    }

    /// `term` clauses in the `should` of the nested filter bool.
    pub fn filter_should<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("term", Category::FilterShould, Shape::PerField, settings)
    }

    /// `term` clauses in the `must_not` of the nested filter bool.
    pub fn filter_must_not<I>(&mut self, settings: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Setting>,
    {
        self.push_clauses("term", Category::FilterMustNot, Shape::PerField, settings)
    }

    /// Extra settings for the bool node, e.g.
    /// `{"minimum_should_match": 1, "boost": 1.0}`. Merged into earlier calls.
    pub fn bool(&mut self, settings: Value) -> &mut Self {
        self.update(move |draft| {
            let settings = expect_settings(settings, "bool")?;
            if let Some(key) = settings
                .keys()
                .find(|key| RESERVED_BOOL_KEYS.contains(&key.as_str()))
            {
                return Err(QueryError::invalid_clause(format!(
                    "bool settings may not set '{}'; use the clause accumulators",
                    key
                )));
            }
            draft.modifiers.extend(settings);
            Ok(())
        })
    }

    /// Wrap the bool node in `dis_max`, e.g. `{"tie_breaker": 0.7, "boost": 1.2}`.
    pub fn dismax(&mut self, settings: Value) -> &mut Self {
        self.update(move |draft| {
            let settings = expect_settings(settings, "dis_max")?;
            if settings.contains_key("queries") {
                return Err(QueryError::invalid_clause(
                    "dis_max settings may not set 'queries'",
                ));
            }
            draft.dismax = Some(settings);
            Ok(())
        })
    }

    /// Wrap the compiled query in a `nested`, `has_parent` or `has_child` node.
    ///
    /// `on` is the nested path, parent type or child type; `settings` carries
    /// extras such as `score_mode`. A later call replaces the wrapper.
    pub fn joins(&mut self, kind: JoinKind, on: &str, settings: Value) -> &mut Self {
        let on = on.to_string();
        self.update(move |draft| {
            let settings = expect_settings(settings, kind.as_str())?;
            draft.join = Some(Join::new(kind, on, settings));
            Ok(())
        })
    }

    /// Sort entries: a string (`"_score"`) is kept as is, an object is split
    /// into one `{field: order}` entry per field. Replaces any earlier sort.
    pub fn order<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let entries: Vec<Value> = entries.into_iter().map(Into::into).collect();
        self.update(move |draft| {
            let mut sort = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    Value::String(_) => sort.push(entry),
                    Value::Object(fields) => sort.extend(fields.into_iter().map(|(field, order)| {
                        Value::Object([(field, order)].into_iter().collect())
                    })),
                    _ => {
                        return Err(QueryError::invalid_clause(
                            "sort entries must be field names or {field: order} mappings",
                        ))
                    }
                }
            }
            draft.sort = Some(sort);
            Ok(())
        })
    }

    /// Return the first `size` hits.
    pub fn limit(&mut self, size: usize) -> &mut Self {
        self.update(move |draft| {
            draft.pagination = Pagination::first(size);
            Ok(())
        })
    }

    /// Return `size` hits starting at offset `from`.
    pub fn limit_from(&mut self, from: usize, size: usize) -> &mut Self {
        self.update(move |draft| {
            draft.pagination = Pagination::window(from, size);
            Ok(())
        })
    }

    /// Control how `_source` is returned with every hit.
    pub fn source(&mut self, source: impl Into<SourceFilter>) -> &mut Self {
        let source = source.into();
        self.update(move |draft| {
            draft.source = Some(source);
            Ok(())
        })
    }
}

fn exists_clauses(fields: &[&str]) -> Vec<Clause> {
    fields
        .iter()
        .map(|field| Clause::field("exists", "field", Value::from(*field)))
        .collect()
}
