//! The aggregation tree and its compilation into the `aggs` fragment.
//!
//! Group nodes are named `group_<field>` and metric nodes `metric_<field>`.
//! Names are unique per container: registering a name twice replaces the
//! earlier node.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::aggregation::kinds::{GroupKind, MetricKind, MetricScope};
use crate::errors::QueryError;
use esql_shared::Settings;

/// Name of the group aggregation over `field`.
pub fn group_name(field: &str) -> String {
    format!("group_{}", field)
}

/// Name of the metric aggregation over `field`.
pub fn metric_name(field: &str) -> String {
    format!("metric_{}", field)
}

/// A bucketing aggregation and the aggregations computed per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub kind: GroupKind,
    pub field: Option<String>,
    pub settings: Settings,
    pub children: AggregationTree,
}

impl GroupNode {
    pub fn new(kind: GroupKind, field: impl Into<String>, settings: Settings) -> Self {
        let field = field.into();
        Self {
            kind,
            field: (!field.is_empty()).then_some(field),
            settings,
            children: AggregationTree::new(),
        }
    }

    pub fn name(&self) -> String {
        group_name(self.field.as_deref().unwrap_or_default())
    }
}

/// A value aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricNode {
    pub kind: MetricKind,
    pub field: Option<String>,
    pub settings: Settings,
}

impl MetricNode {
    /// `field` may be empty for metrics configured purely by settings, such
    /// as `scripted_metric`.
    pub fn new(kind: MetricKind, field: impl Into<String>, settings: Settings) -> Self {
        let field = field.into();
        Self {
            kind,
            field: (!field.is_empty()).then_some(field),
            settings,
        }
    }

    pub fn name(&self) -> String {
        metric_name(self.field.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationNode {
    Group(GroupNode),
    Metric(MetricNode),
}

impl AggregationNode {
    /// `{<kind>: {field, ...settings}}`, plus `aggs` for groups with children.
    pub fn to_value(&self) -> Value {
        let mut node = Map::new();
        match self {
            Self::Group(group) => {
                node.insert(
                    group.kind.as_str().to_string(),
                    body(group.field.as_deref(), &group.settings),
                );
                if !group.children.is_empty() {
                    node.insert("aggs".to_string(), group.children.to_value());
                }
            }
            Self::Metric(metric) => {
                node.insert(
                    metric.kind.as_str().to_string(),
                    body(metric.field.as_deref(), &metric.settings),
                );
            }
        }
        Value::Object(node)
    }
}

/// Aggregations keyed by name, in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationTree {
    nodes: BTreeMap<String, AggregationNode>,
}

impl AggregationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, name: &str) -> Option<&AggregationNode> {
        self.nodes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Insert a node, replacing any node of the same name.
    pub fn insert(&mut self, name: String, node: AggregationNode) -> Option<AggregationNode> {
        let replaced = self.nodes.insert(name, node);
        if let Some(previous) = &replaced {
            warn!(
                node = ?previous,
                "Aggregation name registered twice; the later definition replaces the earlier one"
            );
        }
        replaced
    }

    /// Register a group at the top level and return its name.
    pub fn add_group(&mut self, group: GroupNode) -> String {
        let name = group.name();
        self.insert(name.clone(), AggregationNode::Group(group));
        name
    }

    /// Register a group under an existing group, for group-of-group trees.
    pub fn add_sub_group(&mut self, parent: &str, group: GroupNode) -> Result<String, QueryError> {
        let target = self
            .find_group_mut(parent)
            .ok_or_else(|| QueryError::unknown_group(parent))?;

        let name = group.name();
        target
            .children
            .insert(name.clone(), AggregationNode::Group(group));
        Ok(name)
    }

    /// Register a metric at the top level or under the named group.
    ///
    /// An unknown group leaves the tree untouched.
    pub fn add_metric(
        &mut self,
        metric: MetricNode,
        scope: &MetricScope,
    ) -> Result<String, QueryError> {
        let name = metric.name();
        self.add_named_metric(name, metric, scope)
    }

    /// Register a metric under an explicit name, for metrics whose name is not
    /// derived from a top-level field.
    pub fn add_named_metric(
        &mut self,
        name: String,
        metric: MetricNode,
        scope: &MetricScope,
    ) -> Result<String, QueryError> {
        match scope {
            MetricScope::All => {
                self.insert(name.clone(), AggregationNode::Metric(metric));
            }
            MetricScope::Group(group) => {
                let target = self
                    .find_group_mut(group)
                    .ok_or_else(|| QueryError::unknown_group(group.as_str()))?;
                target
                    .children
                    .insert(name.clone(), AggregationNode::Metric(metric));
            }
        }
        Ok(name)
    }

    /// Find a group by name, searching nested groups depth-first.
    pub fn find_group_mut(&mut self, name: &str) -> Option<&mut GroupNode> {
        if matches!(self.nodes.get(name), Some(AggregationNode::Group(_))) {
            return match self.nodes.get_mut(name) {
                Some(AggregationNode::Group(group)) => Some(group),
                _ => None,
            };
        }

        self.nodes.values_mut().find_map(|node| match node {
            AggregationNode::Group(group) => group.children.find_group_mut(name),
            AggregationNode::Metric(_) => None,
        })
    }

    /// Compile into the `aggs` fragment.
    pub fn to_value(&self) -> Value {
        let aggs: Map<String, Value> = self
            .nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect();
        Value::Object(aggs)
    }
}

fn body(field: Option<&str>, settings: &Settings) -> Value {
    let mut body = settings.clone();
    if let Some(field) = field {
        body.insert("field".to_string(), Value::String(field.to_string()));
    }
    Value::Object(body)
}
