/// Declarative map-chart configuration.
///
/// The charting component consumes a configuration object and performs
/// all rendering, zooming, and tooltip work internally; this module only
/// assembles the data-bearing parts of that object. The geometric join is
/// declared, not performed: the component matches each region's `iso-a3`
/// property against each data entry's `code3`.

use crate::ingest::mapdata::RegionRecord;
use crate::model::CurrentValueEntry;
use serde::Serialize;
use serde_json::Value;

/// Key pair for the declarative join: the geometry-side property name and
/// the data-side field name.
pub const JOIN_KEYS: [&str; 2] = ["iso-a3", "code3"];

pub const MAP_SERIES_NAME: &str = "Current population";

/// The data-bearing series of the map chart.
#[derive(Debug, Clone, Serialize)]
pub struct MapSeries {
    pub name: &'static str,
    /// One entry per country from the parsed table, joined downstream.
    pub data: Vec<CurrentValueEntry>,
    /// Annotated region records, passed through opaquely.
    #[serde(rename = "mapData")]
    pub map_data: Vec<Value>,
    #[serde(rename = "joinBy")]
    pub join_by: [&'static str; 2],
    /// Regions must be selectable for the selection bridge to fire.
    #[serde(rename = "allowPointSelect")]
    pub allow_point_select: bool,
}

/// The configuration object handed to the map component. `series[0]`
/// carries the population dataset.
#[derive(Debug, Clone, Serialize)]
pub struct MapChartConfig {
    pub series: Vec<MapSeries>,
}

/// Assemble the map chart configuration from the derived dataset and the
/// annotated regions.
pub fn build_map_chart(
    entries: Vec<CurrentValueEntry>,
    regions: &[RegionRecord],
) -> MapChartConfig {
    let map_data = regions.iter().map(|r| r.record.clone()).collect();

    MapChartConfig {
        series: vec![MapSeries {
            name: MAP_SERIES_NAME,
            data: entries,
            map_data,
            join_by: JOIN_KEYS,
            allow_point_select: true,
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
