//! Data types produced by the aggregation pipeline.

use serde::Serialize;

/// One row of a ranking: a display name and how many visits it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub name: String,
    pub visit_count: u64,
}

impl RankingEntry {
    pub fn new(name: impl Into<String>, visit_count: u64) -> Self {
        Self {
            name: name.into(),
            visit_count,
        }
    }
}

/// Station and place rankings derived from visit frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    pub top_stations: Vec<RankingEntry>,
    pub all_stations: Vec<RankingEntry>,
    pub top_places: Vec<RankingEntry>,
}

/// Visit count for one rollup window compared with the window before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowMetric {
    pub count: u64,
    pub previous_count: u64,
    pub trend_percent: f64,
}

/// Day, week, month and year rollups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowMetrics {
    pub daily: WindowMetric,
    pub weekly: WindowMetric,
    pub monthly: WindowMetric,
    pub yearly: WindowMetric,
}

/// Data-quality counters gathered while aggregating.
///
/// None of these conditions fail the aggregation; they are reported so a
/// caller can tell a quiet dashboard from a dirty dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total_records: usize,
    /// Records left out of the window counts for a missing or unparseable timestamp.
    pub skipped_records: usize,
    /// Distinct visited station ids that had to fall back to a synthetic label.
    pub missing_station_names: usize,
    /// Distinct visited place ids that had to fall back to a synthetic label.
    pub missing_place_names: usize,
}

/// Everything a dashboard render needs, computed in one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub top_stations: Vec<RankingEntry>,
    pub all_stations: Vec<RankingEntry>,
    pub top_places: Vec<RankingEntry>,
    /// `None` when only rankings were requested.
    pub window_metrics: Option<WindowMetrics>,
    pub diagnostics: Diagnostics,
}
