use chrono::NaiveDateTime;
use tracing::debug;

use crate::aggregate::lookup::{EntityKind, build_lookup};
use crate::aggregate::ranking::aggregate_rankings;
use crate::aggregate::types::{AggregationResult, Diagnostics};
use crate::aggregate::windows::aggregate_windows;
use crate::config::{AggregationConfig, Rollups};
use crate::model::DashboardData;

/// Turns one dashboard load into the metrics and rankings it renders.
///
/// Pure: the same inputs always give the same result. Never fails on bad
/// data; see [`Diagnostics`] for what was tolerated.
pub fn aggregate_dashboard(
    data: &DashboardData,
    config: &AggregationConfig,
    reference: NaiveDateTime,
) -> AggregationResult {
    let station_lookup = build_lookup(EntityKind::Station, &data.stations);
    let place_lookup = build_lookup(EntityKind::Place, &data.places);

    let ranked = aggregate_rankings(&data.visits, &station_lookup, &place_lookup, config.top_n);

    let mut diagnostics = Diagnostics {
        total_records: data.visits.len(),
        missing_station_names: ranked.missing_station_names,
        missing_place_names: ranked.missing_place_names,
        ..Default::default()
    };

    let window_metrics = match config.rollups {
        Rollups::RankingsOnly => None,
        Rollups::RankingsAndWindows => {
            let outcome = aggregate_windows(&data.visits, reference, &config.utc_offset);
            diagnostics.skipped_records = outcome.skipped_records;
            Some(outcome.metrics)
        }
    };

    debug!(
        stations = data.stations.len(),
        places = data.places.len(),
        visits = data.visits.len(),
        ?diagnostics,
        "Dashboard aggregated"
    );

    let rankings = ranked.rankings;
    AggregationResult {
        top_stations: rankings.top_stations,
        all_stations: rankings.all_stations,
        top_places: rankings.top_places,
        window_metrics,
        diagnostics,
    }
}
