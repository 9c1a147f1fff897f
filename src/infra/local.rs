use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::model::{Place, Station, VisitRecord};
use crate::parser::{parse_places, parse_stations, parse_visits};
use crate::services::items_api::{ItemsApi, PLACES_RESOURCE, STATIONS_RESOURCE, VISITS_RESOURCE};

/// Reads exported collections from `<dir>/<Resource>.json`.
///
/// Each file holds the same `{"data": [...]}` payload the API returns.
pub struct LocalItems {
    dir: PathBuf,
}

impl LocalItems {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    async fn read(&self, resource: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(format!("{resource}.json"));
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

#[async_trait]
impl ItemsApi for LocalItems {
    async fn list_stations(&self) -> Result<Vec<Station>> {
        parse_stations(&self.read(STATIONS_RESOURCE).await?)
    }

    async fn list_places(&self) -> Result<Vec<Place>> {
        parse_places(&self.read(PLACES_RESOURCE).await?)
    }

    async fn list_visits(&self) -> Result<Vec<VisitRecord>> {
        parse_visits(&self.read(VISITS_RESOURCE).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::items_api::load_dashboard_data;
    use std::env;
    use std::fs;

    #[tokio::test]
    async fn test_reads_exported_files() {
        let dir = env::temp_dir().join("station_visits_local_items");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("Stations.json"),
            r#"{"data": [{"id": 1, "Station_Name": "Central"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("Visitor_Analysis.json"),
            r#"{"data": [{"date_created": "2024-01-01", "station": 1, "place": 2}]}"#,
        )
        .unwrap();

        let items = LocalItems::new(&dir);
        assert_eq!(items.list_stations().await.unwrap()[0].name, "Central");
        assert!(items.list_places().await.is_err());

        // Places.json is missing: the loader degrades it to empty.
        let data = load_dashboard_data(&items).await;
        assert_eq!(data.stations.len(), 1);
        assert!(data.places.is_empty());
        assert_eq!(data.visits.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }
}
