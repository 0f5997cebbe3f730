//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use xf_core::RecordStore;
use xf_data::{CsvTripSource, DashboardConfig, TripSource, ZoneSet};
use xf_views::build_dashboard;

mod app;
mod paint;

use app::{Screen, TripVizApp};

/// Linked cross-filter dashboard for taxi trip records
#[derive(Parser, Debug)]
#[command(name = "tripviz", version, about)]
struct Args {
    /// Dashboard configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trip CSV file, overrides the configured path
    #[arg(short, long)]
    trips: Option<PathBuf>,

    /// Zone GeoJSON file, overrides the configured path
    #[arg(short, long)]
    zones: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

/// Everything fetched before the engine starts
struct LoadedData {
    store: RecordStore,
    zones: Option<Arc<ZoneSet>>,
}

/// Load trips and zones concurrently
async fn load_data(config: &DashboardConfig) -> Result<LoadedData> {
    let trips_path = config
        .trips_path
        .clone()
        .context("No trip file configured, pass --trips <file.csv>")?;
    let zones_path = if config.has_zone_map() {
        Some(
            config
                .zones_path
                .clone()
                .context("A zone map is configured but no zone file was given, pass --zones <file.geojson>")?,
        )
    } else {
        None
    };

    let source = CsvTripSource::new(trips_path).with_filter(config.ingest.clone());
    let zones = async move {
        match zones_path {
            Some(path) => ZoneSet::load_async(path).await.map(Some),
            None => Ok(None),
        }
    };

    let (rows, zones) = tokio::join!(source.load(), zones);
    let rows = rows.with_context(|| format!("Failed to load trips from {}", source.source_name()))?;
    let zones = zones.context("Failed to load zone polygons")?;

    Ok(LoadedData {
        store: RecordStore::new(rows, &config.payment_labels),
        zones: zones.map(Arc::new),
    })
}

/// Fetch data and assemble the dashboard, or explain why not
fn start(config: &DashboardConfig, runtime: &tokio::runtime::Runtime) -> Screen {
    let prepared = runtime.block_on(load_data(config)).and_then(|data| {
        let mut dashboard = build_dashboard(config, data.zones)?;
        let pass = dashboard.load(data.store);
        info!("Dashboard ready: {} trips", pass.total);
        Ok(dashboard)
    });

    match prepared {
        Ok(dashboard) => Screen::Ready(dashboard),
        Err(e) => {
            error!("Failed to start dashboard: {:#}", e);
            Screen::Failed(format!("{:#}", e))
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(trips) = args.trips {
        config.trips_path = Some(trips);
    }
    if let Some(zones) = args.zones {
        config.zones_path = Some(zones);
    }
    config.validate()?;

    if let Some(path) = args.dump_config {
        config.save(&path)?;
        info!("Wrote configuration to {:?}", path);
        return Ok(());
    }

    info!("Starting trip dashboard");

    let runtime = tokio::runtime::Runtime::new()?;
    let screen = start(&config, &runtime);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Taxi trips",
        options,
        Box::new(move |_cc| Box::new(TripVizApp::new(screen))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
