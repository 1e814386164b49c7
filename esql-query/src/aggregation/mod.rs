//! Aggregation trees.
//!
//! Groups bucket the matched documents; metrics compute values either over all
//! documents or per bucket of one group.

mod kinds;
mod tree;

pub use kinds::{GroupKind, MetricKind, MetricScope, ALL_DOCUMENTS};
pub use tree::{
    group_name, metric_name, AggregationNode, AggregationTree, GroupNode, MetricNode,
};
