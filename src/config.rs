//! Runtime configuration: where the items API lives and what to aggregate.

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};

use crate::aggregate::ranking::DEFAULT_TOP_N;

/// How the API token is attached to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenMode {
    /// `Authorization: Bearer <token>`
    #[default]
    Header,
    /// `?access_token=<token>`
    Query,
}

impl std::str::FromStr for TokenMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(TokenMode::Header),
            "query" => Ok(TokenMode::Query),
            other => Err(anyhow::anyhow!(
                "unknown token mode '{other}' (expected header or query)"
            )),
        }
    }
}

/// Connection settings for the remote items API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Always ends with `/`.
    pub base_url: String,
    pub token: Option<String>,
    pub token_mode: TokenMode,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Self {
            base_url,
            token: None,
            token_mode: TokenMode::default(),
        }
    }

    /// Reads `DASHBOARD_BASE_URL`, `DASHBOARD_API_TOKEN` and `DASHBOARD_TOKEN_MODE`.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DASHBOARD_BASE_URL").context("DASHBOARD_BASE_URL must be set")?;

        let mut config = Self::new(&base_url);
        config.token = std::env::var("DASHBOARD_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        if let Ok(mode) = std::env::var("DASHBOARD_TOKEN_MODE") {
            config.token_mode = mode.parse()?;
        }

        Ok(config)
    }

    /// URL of a collection with an effectively unbounded limit.
    pub fn items_url(&self, resource: &str) -> String {
        format!("{}items/{}?limit=1000000", self.base_url, resource)
    }
}

/// Which rollups a dashboard needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rollups {
    RankingsOnly,
    #[default]
    RankingsAndWindows,
}

/// Parameters of one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    pub top_n: usize,
    pub rollups: Rollups,
    /// Zone in which calendar days are computed.
    pub utc_offset: FixedOffset,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            rollups: Rollups::default(),
            utc_offset: Utc.fix(),
        }
    }
}

impl AggregationConfig {
    /// Builds an offset from whole hours east of UTC.
    pub fn with_offset_hours(mut self, hours: i32) -> Result<Self> {
        self.utc_offset = FixedOffset::east_opt(hours * 3600)
            .with_context(|| format!("UTC offset of {hours} hours is out of range"))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(ApiConfig::new("https://cms.example.org").base_url, "https://cms.example.org/");
        assert_eq!(ApiConfig::new("https://cms.example.org/").base_url, "https://cms.example.org/");
    }

    #[test]
    fn test_items_url() {
        let config = ApiConfig::new("https://cms.example.org");

        assert_eq!(
            config.items_url("Stations"),
            "https://cms.example.org/items/Stations?limit=1000000"
        );
    }

    #[test]
    fn test_token_mode_parse() {
        assert_eq!("header".parse::<TokenMode>().unwrap(), TokenMode::Header);
        assert_eq!("QUERY".parse::<TokenMode>().unwrap(), TokenMode::Query);
        assert!("cookie".parse::<TokenMode>().is_err());
    }

    #[test]
    fn test_aggregation_defaults() {
        let config = AggregationConfig::default();

        assert_eq!(config.top_n, 5);
        assert_eq!(config.rollups, Rollups::RankingsAndWindows);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn test_offset_hours() {
        let config = AggregationConfig::default().with_offset_hours(5).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), 5 * 3600);

        assert!(AggregationConfig::default().with_offset_hours(30).is_err());
    }
}
