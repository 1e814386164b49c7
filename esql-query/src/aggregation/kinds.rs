//! Aggregation kinds and metric placement.

use std::fmt;

/// Sentinel scope meaning "all documents" rather than a group's buckets.
pub const ALL_DOCUMENTS: &str = "*";

/// Bucketing aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Terms,
    DateHistogram,
    Histogram,
    DateRange,
    IpRange,
    Range,
    GeoDistance,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::DateHistogram => "date_histogram",
            Self::Histogram => "histogram",
            Self::DateRange => "date_range",
            Self::IpRange => "ip_range",
            Self::Range => "range",
            Self::GeoDistance => "geo_distance",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value aggregations, computed globally or per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Avg,
    Cardinality,
    ExtendedStats,
    GeoBounds,
    GeoCentroid,
    Max,
    Min,
    Percentiles,
    PercentileRanks,
    Stats,
    Sum,
    ValueCount,
    ScriptedMetric,
    WeightedAvg,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Cardinality => "cardinality",
            Self::ExtendedStats => "extended_stats",
            Self::GeoBounds => "geo_bounds",
            Self::GeoCentroid => "geo_centroid",
            Self::Max => "max",
            Self::Min => "min",
            Self::Percentiles => "percentiles",
            Self::PercentileRanks => "percentile_ranks",
            Self::Stats => "stats",
            Self::Sum => "sum",
            Self::ValueCount => "value_count",
            Self::ScriptedMetric => "scripted_metric",
            Self::WeightedAvg => "weighted_avg",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a metric is attached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MetricScope {
    /// Top level of the tree, computed over all matched documents.
    #[default]
    All,
    /// Under the named group's `aggs`.
    Group(String),
}

impl From<&str> for MetricScope {
    /// `""` and `"*"` mean all documents; anything else names a group.
    fn from(name: &str) -> Self {
        match name {
            "" | ALL_DOCUMENTS => Self::All,
            group => Self::Group(group.to_string()),
        }
    }
}

impl From<String> for MetricScope {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Option<&str>> for MetricScope {
    fn from(name: Option<&str>) -> Self {
        name.map(Self::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_sentinels() {
        assert_eq!(MetricScope::from("*"), MetricScope::All);
        assert_eq!(MetricScope::from(""), MetricScope::All);
        assert_eq!(MetricScope::from(None), MetricScope::All);
        assert_eq!(
            MetricScope::from("group_Name"),
            MetricScope::Group("group_Name".to_string())
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(GroupKind::DateHistogram.as_str(), "date_histogram");
        assert_eq!(MetricKind::ValueCount.to_string(), "value_count");
    }
}
