//! Query document compilation.
//!
//! This module turns an accumulated draft into the final search document. The
//! shape of `query` follows the cheapest representation the engine accepts:
//!
//! - no clauses at all: `match_all`
//! - a single filter-only clause: the clause itself
//! - several filter-only clauses: `constant_score`
//! - anything else: a `bool` node, optionally inside `dis_max`
//!
//! A join wrapper, when present, wraps whichever shape was chosen.

use serde_json::{json, Map, Value};

use crate::builder::Draft;
use crate::clause::{insert_sequence, ClauseSet};
use crate::errors::QueryError;
use crate::join::Join;
use esql_shared::{Pagination, Settings};

/// Compile a draft into the template string.
pub(crate) fn compile_document(draft: &Draft) -> Result<String, QueryError> {
    let document = build_document(draft)?;
    serde_json::to_string(&document).map_err(|e| QueryError::serialization(e.to_string()))
}

/// Assemble `query` and its document-level siblings.
pub(crate) fn build_document(draft: &Draft) -> Result<Value, QueryError> {
    let mut document = Map::new();

    document.insert(
        "query".to_string(),
        build_query(
            &draft.clauses,
            &draft.modifiers,
            draft.dismax.as_ref(),
            draft.join.as_ref(),
        ),
    );

    if let Some(sort) = &draft.sort {
        document.insert("sort".to_string(), Value::Array(sort.clone()));
    }

    if let Pagination::Window { from, size } = draft.pagination {
        document.insert("from".to_string(), json!(from));
        document.insert("size".to_string(), json!(size));
    }

    if let Some(source) = &draft.source {
        let source =
            serde_json::to_value(source).map_err(|e| QueryError::serialization(e.to_string()))?;
        document.insert("_source".to_string(), source);
    }

    if !draft.aggregations.is_empty() {
        document.insert("aggs".to_string(), draft.aggregations.to_value());
    }

    Ok(Value::Object(document))
}

/// Build the `query` value.
pub(crate) fn build_query(
    clauses: &ClauseSet,
    modifiers: &Settings,
    dismax: Option<&Settings>,
    join: Option<&Join>,
) -> Value {
    let filter = clauses.folded_filter();

    let filter_only = clauses.must().is_empty()
        && clauses.must_not().is_empty()
        && clauses.should().is_empty()
        && modifiers.is_empty()
        && dismax.is_none();

    let query = if filter_only {
        match filter.as_slice() {
            [] => json!({ "match_all": {} }),
            [single] => single.to_value(),
            many => {
                let many: Vec<Value> = many.iter().map(|clause| clause.to_value()).collect();
                json!({ "constant_score": { "filter": many } })
            }
        }
    } else {
        let mut node = modifiers.clone();
        insert_sequence(&mut node, "must", clauses.must());
        insert_sequence(&mut node, "must_not", clauses.must_not());
        insert_sequence(&mut node, "should", clauses.should());
        insert_sequence(&mut node, "filter", &filter);

        match dismax {
            Some(dismax) => build_dis_max(dismax, node),
            None => json!({ "bool": node }),
        }
    };

    match join {
        Some(join) => join.wrap(query),
        None => query,
    }
}

/// Nest the bool node under `dis_max.queries`.
fn build_dis_max(dismax: &Settings, bool_node: Settings) -> Value {
    let mut node = dismax.clone();
    node.insert("queries".to_string(), json!({ "bool": bool_node }));
    json!({ "dis_max": node })
}
