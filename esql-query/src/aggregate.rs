//! Aggregation accumulators.
//!
//! Groups are registered as `group_<field>`; metrics as `metric_<field>`, either
//! at the top level or inside a group's `aggs`.

use serde_json::{json, Value};

use crate::aggregation::{
    metric_name, GroupKind, GroupNode, MetricKind, MetricNode, MetricScope,
};
use crate::builder::QueryBuilder;
use crate::clause::expect_settings;

impl QueryBuilder {
    /// Group by the distinct values of `field` (`terms`).
    pub fn group(&mut self, field: &str) -> &mut Self {
        self.group_with(GroupKind::Terms, field, Value::Null)
    }

    /// Register a top-level group of any kind.
    pub fn group_with(&mut self, kind: GroupKind, field: &str, settings: Value) -> &mut Self {
        let field = field.to_string();
        self.update(move |draft| {
            let settings = expect_settings(settings, kind.as_str())?;
            draft
                .aggregations
                .add_group(GroupNode::new(kind, field, settings));
            Ok(())
        })
    }

    /// `terms`, e.g. `{"size": 10, "order": {"_count": "asc"}}`.
    pub fn group_terms(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::Terms, field, settings)
    }

    /// `date_histogram`, e.g. `{"interval": "month"}`.
    pub fn group_date_histogram(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::DateHistogram, field, settings)
    }

    /// `histogram`, e.g. `{"interval": 50}`.
    pub fn group_histogram(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::Histogram, field, settings)
    }

    /// `date_range`, e.g. `{"format": "MM-yyy", "ranges": [{"to": "now-10M/M"}]}`.
    pub fn group_date_range(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::DateRange, field, settings)
    }

    /// `ip_range`, e.g. `{"ranges": [{"mask": "10.0.0.0/25"}]}`.
    pub fn group_ip_range(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::IpRange, field, settings)
    }

    /// `range`, e.g. `{"ranges": [{"to": 100.0}, {"from": 100.0}]}`.
    pub fn group_range(&mut self, field: &str, settings: Value) -> &mut Self {
        self.group_with(GroupKind::Range, field, settings)
    }

    /// `geo_distance` around `origin`, e.g. `"52.3760, 4.894"`.
    pub fn group_geo_distance(&mut self, field: &str, origin: &str, settings: Value) -> &mut Self {
        let field = field.to_string();
        let origin = origin.to_string();
        self.update(move |draft| {
            let mut settings = expect_settings(settings, GroupKind::GeoDistance.as_str())?;
            settings.insert("origin".to_string(), Value::String(origin));
            draft
                .aggregations
                .add_group(GroupNode::new(GroupKind::GeoDistance, field, settings));
            Ok(())
        })
    }

    /// Register a group inside an existing group's buckets.
    pub fn sub_group(
        &mut self,
        parent: &str,
        kind: GroupKind,
        field: &str,
        settings: Value,
    ) -> &mut Self {
        let parent = parent.to_string();
        let field = field.to_string();
        self.update(move |draft| {
            let settings = expect_settings(settings, kind.as_str())?;
            draft
                .aggregations
                .add_sub_group(&parent, GroupNode::new(kind, field, settings))?;
            Ok(())
        })
    }

    /// Register a metric of any kind.
    ///
    /// `scope` is `"*"` (or `""`) for all matched documents, otherwise the
    /// name of a registered group such as `"group_Name"`.
    pub fn metric(
        &mut self,
        kind: MetricKind,
        field: &str,
        settings: Value,
        scope: impl Into<MetricScope>,
    ) -> &mut Self {
        let field = field.to_string();
        let scope = scope.into();
        self.update(move |draft| {
            let settings = expect_settings(settings, kind.as_str())?;
            draft
                .aggregations
                .add_metric(MetricNode::new(kind, field, settings), &scope)?;
            Ok(())
        })
    }

    pub fn avg(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::Avg, field, Value::Null, scope)
    }

    pub fn sum(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::Sum, field, Value::Null, scope)
    }

    pub fn min(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::Min, field, Value::Null, scope)
    }

    pub fn max(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::Max, field, Value::Null, scope)
    }

    pub fn stats(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::Stats, field, Value::Null, scope)
    }

    pub fn extended_stats(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::ExtendedStats, field, Value::Null, scope)
    }

    /// Number of values extracted from the aggregated documents.
    pub fn value_count(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::ValueCount, field, Value::Null, scope)
    }

    pub fn geo_bounds(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::GeoBounds, field, Value::Null, scope)
    }

    pub fn geo_centroid(&mut self, field: &str, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::GeoCentroid, field, Value::Null, scope)
    }

    /// Approximate distinct count, e.g. `{"precision_threshold": 100}`.
    pub fn cardinality(
        &mut self,
        field: &str,
        settings: Value,
        scope: impl Into<MetricScope>,
    ) -> &mut Self {
        self.metric(MetricKind::Cardinality, field, settings, scope)
    }

    /// e.g. `{"percents": [95, 99]}`.
    pub fn percentiles(
        &mut self,
        field: &str,
        settings: Value,
        scope: impl Into<MetricScope>,
    ) -> &mut Self {
        self.metric(MetricKind::Percentiles, field, settings, scope)
    }

    /// e.g. `{"values": [500, 600], "keyed": false}`.
    pub fn percentile_ranks(
        &mut self,
        field: &str,
        settings: Value,
        scope: impl Into<MetricScope>,
    ) -> &mut Self {
        self.metric(MetricKind::PercentileRanks, field, settings, scope)
    }

    /// A metric defined purely by its scripts; registered as `metric_`.
    pub fn scripted_metric(&mut self, settings: Value, scope: impl Into<MetricScope>) -> &mut Self {
        self.metric(MetricKind::ScriptedMetric, "", settings, scope)
    }

    /// Average of `value_field` weighted by `weight_field`, registered as
    /// `metric_<value_field>`.
    pub fn weighted_avg(
        &mut self,
        value_field: &str,
        weight_field: &str,
        scope: impl Into<MetricScope>,
    ) -> &mut Self {
        let name = metric_name(value_field);
        let settings = json!({
            "value": { "field": value_field },
            "weight": { "field": weight_field },
        });
        let scope = scope.into();
        self.update(move |draft| {
            let settings = expect_settings(settings, MetricKind::WeightedAvg.as_str())?;
            draft.aggregations.add_named_metric(
                name,
                MetricNode::new(MetricKind::WeightedAvg, "", settings),
                &scope,
            )?;
            Ok(())
        })
    }
}
