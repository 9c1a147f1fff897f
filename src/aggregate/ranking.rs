//! Frequency rankings of stations and places.

use indexmap::IndexMap;
use tracing::debug;

use crate::aggregate::lookup::Lookup;
use crate::aggregate::types::{RankingEntry, Rankings};
use crate::model::{EntityId, Station, VisitRecord};

/// Number of entries in the top-N pie charts.
pub const DEFAULT_TOP_N: usize = 5;

/// Rankings plus the number of distinct ids per category that had no name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingOutcome {
    pub rankings: Rankings,
    pub missing_station_names: usize,
    pub missing_place_names: usize,
}

/// Counts visits per station and per place and ranks them.
///
/// Rankings only contain ids that were actually visited; catalog entries with
/// no visits never appear. A record without a station (or place) reference
/// is left out of that category's ranking only. Equal counts keep the order
/// in which ids were first seen in `records`.
pub fn aggregate_rankings(
    records: &[VisitRecord],
    station_lookup: &Lookup,
    place_lookup: &Lookup,
    top_n: usize,
) -> RankingOutcome {
    let mut station_counts: IndexMap<&EntityId, u64> = IndexMap::new();
    let mut place_counts: IndexMap<&EntityId, u64> = IndexMap::new();

    for record in records {
        if let Some(id) = &record.station_id {
            *station_counts.entry(id).or_default() += 1;
        }
        if let Some(id) = &record.place_id {
            *place_counts.entry(id).or_default() += 1;
        }
    }

    let (all_stations, missing_station_names) = rank(station_counts, station_lookup);
    let (all_places, missing_place_names) = rank(place_counts, place_lookup);

    debug!(
        records = records.len(),
        stations = all_stations.len(),
        places = all_places.len(),
        missing_station_names,
        missing_place_names,
        "Rankings aggregated"
    );

    let top_stations = top(&all_stations, top_n);
    let top_places = top(&all_places, top_n);

    RankingOutcome {
        rankings: Rankings {
            top_stations,
            all_stations,
            top_places,
        },
        missing_station_names,
        missing_place_names,
    }
}

fn rank(counts: IndexMap<&EntityId, u64>, lookup: &Lookup) -> (Vec<RankingEntry>, usize) {
    let mut missing = 0;

    let mut entries: Vec<RankingEntry> = counts
        .into_iter()
        .map(|(id, visit_count)| {
            let (name, fell_back) = lookup.resolve(id);
            if fell_back {
                missing += 1;
            }
            RankingEntry { name, visit_count }
        })
        .collect();

    // sort_by is stable: ties stay in first-seen order
    entries.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));

    (entries, missing)
}

fn top(ranking: &[RankingEntry], n: usize) -> Vec<RankingEntry> {
    ranking.iter().take(n).cloned().collect()
}

/// Ranks stations by the precomputed `visitors_count` on the catalog rows.
///
/// Missing counts rank as zero. Equal counts keep catalog order.
pub fn catalog_station_ranking(stations: &[Station], top_n: usize) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = stations
        .iter()
        .map(|s| RankingEntry::new(s.name.clone(), s.visitors_count.unwrap_or(0)))
        .collect();

    entries.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    entries.truncate(top_n);
    entries
}

/// Subset of the all-stations ranking shown in the bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFilter {
    All,
    /// The `n` most visited, most visited first.
    Top(usize),
    /// The `n` least visited, least visited first.
    Least(usize),
}

impl std::str::FromStr for ChartFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "all" => Ok(ChartFilter::All),
            "top10" => Ok(ChartFilter::Top(10)),
            "least10" => Ok(ChartFilter::Least(10)),
            other => Err(anyhow::anyhow!(
                "unknown chart filter '{other}' (expected all, top10 or least10)"
            )),
        }
    }
}

/// Applies a name search and a [`ChartFilter`] to a ranking.
///
/// `search` matches case-insensitively anywhere in the name. The search is
/// applied first, then the filter.
pub fn select_chart_entries(
    ranking: &[RankingEntry],
    filter: ChartFilter,
    search: Option<&str>,
) -> Vec<RankingEntry> {
    let needle = search.map(str::to_lowercase);

    let mut selected: Vec<RankingEntry> = ranking
        .iter()
        .filter(|e| match &needle {
            Some(n) => e.name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .cloned()
        .collect();

    match filter {
        ChartFilter::All => {}
        ChartFilter::Top(n) => {
            selected.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
            selected.truncate(n);
        }
        ChartFilter::Least(n) => {
            selected.sort_by(|a, b| a.visit_count.cmp(&b.visit_count));
            selected.truncate(n);
        }
    }

    selected
}
