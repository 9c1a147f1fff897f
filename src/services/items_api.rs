//! Trait and loader for the three datasets a dashboard needs.

use anyhow::Result;
use tracing::{error, info};

use crate::model::{DashboardData, Place, Station, VisitRecord};

/// Collection names on the items API.
pub const STATIONS_RESOURCE: &str = "Stations";
pub const PLACES_RESOURCE: &str = "Places";
pub const VISITS_RESOURCE: &str = "Visitor_Analysis";

/// Abstraction over a source of station, place and visit collections.
#[async_trait::async_trait]
pub trait ItemsApi: Send + Sync {
    async fn list_stations(&self) -> Result<Vec<Station>>;

    async fn list_places(&self) -> Result<Vec<Place>>;

    async fn list_visits(&self) -> Result<Vec<VisitRecord>>;
}

fn or_empty<T>(result: Result<Vec<T>>, resource: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!(resource, error = %e, "Fetch failed, continuing with empty collection");
        Vec::new()
    })
}

/// Fetches all three collections concurrently.
///
/// A failed fetch is logged and replaced by an empty collection, so the
/// dashboard still renders whatever could be loaded.
#[tracing::instrument(skip(api))]
pub async fn load_dashboard_data(api: &dyn ItemsApi) -> DashboardData {
    let (stations, places, visits) =
        tokio::join!(api.list_stations(), api.list_places(), api.list_visits());

    let data = DashboardData {
        stations: or_empty(stations, STATIONS_RESOURCE),
        places: or_empty(places, PLACES_RESOURCE),
        visits: or_empty(visits, VISITS_RESOURCE),
    };

    info!(
        stations = data.stations.len(),
        places = data.places.len(),
        visits = data.visits.len(),
        "Dashboard data loaded"
    );

    data
}
