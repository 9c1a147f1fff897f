//! CLI entry point for the station visits dashboard.
//!
//! Provides subcommands for printing the dashboard summary, exporting the
//! all-stations chart data and listing the catalog-based station ranking.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use station_visits::{
    aggregate::aggregate_dashboard,
    aggregate::ranking::{ChartFilter, catalog_station_ranking, select_chart_entries},
    config::{AggregationConfig, ApiConfig, Rollups},
    infra::{directus::DirectusClient, local::LocalItems},
    model::DashboardData,
    output::{HistoryRow, append_history, print_json, print_pretty, write_ranking},
    services::items_api::{ItemsApi, load_dashboard_data},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_visits")]
#[command(about = "Aggregate station visit statistics for the dashboard", long_about = None)]
struct Cli {
    /// Read `<Resource>.json` exports from this directory instead of the API
    #[arg(long, global = true, value_name = "DIR")]
    from_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print window metrics and top station/place rankings
    Summary {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Number of entries in the top rankings
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,

        /// Skip the day/week/month/year rollups
        #[arg(long, default_value_t = false)]
        rankings_only: bool,

        /// Hours east of UTC that calendar days are computed in
        #[arg(long, env = "DASHBOARD_UTC_OFFSET_HOURS", default_value_t = 0, allow_hyphen_values = true)]
        utc_offset_hours: i32,

        /// Anchor the windows on this day (YYYY-MM-DD) instead of now
        #[arg(long)]
        reference_date: Option<NaiveDate>,

        /// Optional: CSV file to append the window metrics to
        #[arg(long)]
        history: Option<String>,
    },
    /// Export the all-stations bar chart data as CSV
    Export {
        /// CSV file to write
        #[arg(short, long, default_value = "stations.csv")]
        output: String,

        /// Which stations to include: all, top10 or least10
        #[arg(long, default_value = "all")]
        filter: ChartFilter,

        /// Only stations whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },
    /// List the stations ranked by the catalog's precomputed visitor counts
    Catalog {
        /// Number of stations to list
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_visits.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_visits.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let api = items_api(cli.from_dir.as_deref())?;

    match cli.command {
        Commands::Summary {
            format,
            top_n,
            rankings_only,
            utc_offset_hours,
            reference_date,
            history,
        } => {
            let config = AggregationConfig {
                top_n,
                rollups: if rankings_only {
                    Rollups::RankingsOnly
                } else {
                    Rollups::RankingsAndWindows
                },
                ..Default::default()
            }
            .with_offset_hours(utc_offset_hours)?;

            let reference = reference_instant(&config, reference_date)?;
            let data = load_dashboard_data(api.as_ref()).await;
            warn_if_empty(&data);

            let result = aggregate_dashboard(&data, &config, reference);

            match format {
                Format::Pretty => print_pretty(&result),
                Format::Json => print_json(&result)?,
            }

            if let Some(path) = history {
                match &result.window_metrics {
                    Some(metrics) => {
                        let row =
                            HistoryRow::new(Utc::now(), metrics, result.diagnostics.skipped_records);
                        append_history(&path, &row)?;
                        info!(path = %path, "History row appended");
                    }
                    None => warn!("No window metrics computed, history not written"),
                }
            }
        }
        Commands::Export {
            output,
            filter,
            search,
        } => {
            let data = load_dashboard_data(api.as_ref()).await;
            warn_if_empty(&data);

            let config = AggregationConfig {
                rollups: Rollups::RankingsOnly,
                ..Default::default()
            };
            let result = aggregate_dashboard(&data, &config, Utc::now().naive_utc());
            let selected = select_chart_entries(&result.all_stations, filter, search.as_deref());

            write_ranking(&output, &selected)?;
            info!(output = %output, stations = selected.len(), "Station chart data exported");
        }
        Commands::Catalog { top_n } => {
            let stations = api.list_stations().await?;
            let ranking = catalog_station_ranking(&stations, top_n);

            info!(total = stations.len(), "Station catalog fetched");

            for (position, entry) in ranking.iter().enumerate() {
                info!(
                    position = position + 1,
                    station = %entry.name,
                    visitors = entry.visit_count,
                    "Station"
                );
            }
        }
    }

    Ok(())
}

/// Picks the local export directory when given, the remote API otherwise.
fn items_api(from_dir: Option<&str>) -> Result<Box<dyn ItemsApi>> {
    let api: Box<dyn ItemsApi> = match from_dir {
        Some(dir) => {
            info!(dir, "Reading collections from local exports");
            Box::new(LocalItems::new(dir))
        }
        None => {
            let config = ApiConfig::from_env()?;
            info!(base_url = %config.base_url, "Reading collections from items API");
            Box::new(DirectusClient::new(config)?)
        }
    };
    Ok(api)
}

/// Now in the configured offset, or noon of `date` when one is given.
fn reference_instant(config: &AggregationConfig, date: Option<NaiveDate>) -> Result<NaiveDateTime> {
    match date {
        Some(date) => date
            .and_hms_opt(12, 0, 0)
            .context("invalid reference date"),
        None => Ok(Utc::now().with_timezone(&config.utc_offset).naive_local()),
    }
}

fn warn_if_empty(data: &DashboardData) {
    if data.visits.is_empty() {
        warn!("No visit records loaded, rankings and counts will be empty");
    }
}
