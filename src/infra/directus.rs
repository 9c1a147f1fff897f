use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::{ApiConfig, TokenMode};
use crate::fetch::auth::{ApiKey, UrlParam};
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::model::{Place, Station, VisitRecord};
use crate::parser::{parse_places, parse_stations, parse_visits};
use crate::services::items_api::{ItemsApi, PLACES_RESOURCE, STATIONS_RESOURCE, VISITS_RESOURCE};

/// Reads collections from a Directus-style `items/<Resource>` REST API.
pub struct DirectusClient {
    config: ApiConfig,
    http: Box<dyn HttpClient>,
}

impl DirectusClient {
    /// Builds a client, wrapping it in the token scheme `config` asks for.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let basic = BasicClient::new()?;

        let http: Box<dyn HttpClient> = match (&config.token, config.token_mode) {
            (None, _) => Box::new(basic),
            (Some(token), TokenMode::Header) => Box::new(ApiKey::bearer(basic, token)?),
            (Some(token), TokenMode::Query) => Box::new(UrlParam::access_token(basic, token)),
        };

        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: ApiConfig, http: Box<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_resource(&self, resource: &str) -> Result<Vec<u8>> {
        let url = self.config.items_url(resource);
        let bytes = fetch_bytes(self.http.as_ref(), &url)
            .await
            .with_context(|| format!("failed to fetch {resource}"))?;
        debug!(bytes = bytes.len(), "Collection received");
        Ok(bytes)
    }
}

#[async_trait]
impl ItemsApi for DirectusClient {
    async fn list_stations(&self) -> Result<Vec<Station>> {
        parse_stations(&self.fetch_resource(STATIONS_RESOURCE).await?)
    }

    async fn list_places(&self) -> Result<Vec<Place>> {
        parse_places(&self.fetch_resource(PLACES_RESOURCE).await?)
    }

    async fn list_visits(&self) -> Result<Vec<VisitRecord>> {
        parse_visits(&self.fetch_resource(VISITS_RESOURCE).await?)
    }
}
