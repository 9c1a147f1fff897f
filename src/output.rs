//! Output formatting and persistence for aggregation results.
//!
//! Supports pretty-printing, JSON serialization, CSV export of a ranking and
//! CSV append of window-metric history.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::types::{AggregationResult, RankingEntry, WindowMetrics};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs the result using Rust's debug pretty-print format.
pub fn print_pretty(result: &AggregationResult) {
    info!("{:#?}", result);
}

/// Logs the result as pretty-printed JSON.
pub fn print_json(result: &AggregationResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Writes a ranking to `path` as `name,visit_count` rows, replacing any existing file.
pub fn write_ranking(path: &str, ranking: &[RankingEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for entry in ranking {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    debug!(path, rows = ranking.len(), "Ranking written");
    Ok(())
}

/// One row of window-metric history.
#[derive(Debug, Serialize)]
pub struct HistoryRow {
    pub timestamp: DateTime<Utc>,
    pub daily: u64,
    pub daily_trend: f64,
    pub weekly: u64,
    pub weekly_trend: f64,
    pub monthly: u64,
    pub monthly_trend: f64,
    pub yearly: u64,
    pub yearly_trend: f64,
    pub skipped_records: usize,
}

impl HistoryRow {
    pub fn new(timestamp: DateTime<Utc>, metrics: &WindowMetrics, skipped_records: usize) -> Self {
        Self {
            timestamp,
            daily: metrics.daily.count,
            daily_trend: metrics.daily.trend_percent,
            weekly: metrics.weekly.count,
            weekly_trend: metrics.weekly.trend_percent,
            monthly: metrics.monthly.count,
            monthly_trend: metrics.monthly.trend_percent,
            yearly: metrics.yearly.count,
            yearly_trend: metrics.yearly.trend_percent,
            skipped_records,
        }
    }
}

/// Appends a [`HistoryRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_history(path: &str, row: &HistoryRow) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending history row");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}
