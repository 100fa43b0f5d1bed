//! Dashboard initialization sequence.
//!
//! Fetches both inputs to completion, parses the export, derives the map
//! dataset, assembles the chart configuration, and pre-selects the `us`
//! region through the selection bridge, mirroring the dashboard's
//! on-load behavior. A failed fetch aborts initialization; there is no
//! retry. Set POPMAP_SNAPSHOT_DIR to replay saved payloads instead of
//! hitting the live endpoints.

use popmap_service::analysis::joining;
use popmap_service::chart;
use popmap_service::config::Endpoints;
use popmap_service::dev_mode::DevMode;
use popmap_service::ingest::{mapdata, worldbank};
use popmap_service::logging::{self, DataSource, LogLevel};
use popmap_service::selection::{SelectedRegion, SelectionContext};
use serde_json::Value;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    logging::init_logger(LogLevel::Info, None, false);

    let endpoints = Endpoints::load();
    let (topology, csv) = load_inputs(&endpoints)?;

    let table = worldbank::parse_population_csv(&csv)?;
    let regions = mapdata::annotate_regions(mapdata::extract_regions(&topology));
    let entries = joining::current_values(&table);
    let config = chart::build_map_chart(entries, &regions);

    logging::info(
        DataSource::System,
        None,
        &format!(
            "map chart ready: {} countries, {} regions, joined by {:?}",
            config.series[0].data.len(),
            config.series[0].map_data.len(),
            chart::JOIN_KEYS
        ),
    );

    // Pre-select a country, as the dashboard does on load.
    let mut context = SelectionContext::new(table);
    let preselected = regions
        .iter()
        .find(|r| r.id == "us")
        .and_then(SelectedRegion::from_region);

    if let Some(selected) = preselected {
        let update = context.on_selection_changed(std::slice::from_ref(&selected));
        if let Some(history) = update.chart {
            logging::info(
                DataSource::System,
                Some(&selected.code3),
                &format!(
                    "pre-selected {}: {} series from {}",
                    update.panel.heading,
                    history.series.len(),
                    history
                        .point_start
                        .map_or("?".to_string(), |y| y.to_string())
                ),
            );
        }
    } else {
        logging::warn(
            DataSource::MapData,
            Some("us"),
            "pre-selection target missing from topology",
        );
    }

    Ok(())
}

/// Produce both payloads, from local snapshots when configured and
/// available, otherwise from the live endpoints. Both must complete
/// before parsing begins: category derivation needs the CSV text and the
/// map dataset needs both payloads.
fn load_inputs(endpoints: &Endpoints) -> Result<(Value, String), Box<dyn Error>> {
    if let Ok(dir) = std::env::var("POPMAP_SNAPSHOT_DIR") {
        let dev = DevMode::new(dir);
        if dev.snapshot_available() {
            logging::info(
                DataSource::System,
                None,
                &format!("replaying snapshots from {}", dev.data_dir.display()),
            );
            return Ok((dev.load_topology()?, dev.load_population_csv()?));
        }
        logging::warn(
            DataSource::System,
            None,
            &format!(
                "POPMAP_SNAPSHOT_DIR set but snapshots missing in {}, fetching live",
                dev.data_dir.display()
            ),
        );
    }

    let client = endpoints.http_client()?;

    let topology = match mapdata::fetch_topology(&client, &endpoints.topology_url) {
        Ok(document) => document,
        Err(e) => {
            logging::log_mapdata_failure("topology fetch", e.as_ref());
            return Err(e);
        }
    };
    let csv = match worldbank::fetch_population_csv(&client, &endpoints.population_csv_url) {
        Ok(text) => text,
        Err(e) => {
            logging::log_worldbank_failure("population export fetch", e.as_ref());
            return Err(e);
        }
    };

    Ok((topology, csv))
}
