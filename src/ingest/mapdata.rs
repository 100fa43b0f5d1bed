/// World topology client and region-record extraction.
///
/// The topology document is an external input consumed opaquely: the map
/// component does its own geometry conversion and rendering. This module
/// only pulls out the per-region records the dashboard needs to annotate
/// (the map-region key `hc-key`, the ISO alpha-3 join key, and a derived
/// flag asset key) and passes everything else through untouched as
/// `mapData`.

use crate::logging::{self, DataSource};
use crate::model::IngestError;
use serde_json::Value;
use std::error::Error;

// ============================================================================
// Region records
// ============================================================================

/// One map region, annotated for the dashboard.
///
/// `record` is the original topology record with `id` and `flag` inserted
/// in place, retained opaquely for the chart's `mapData` passthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    /// Map-region key, from `properties["hc-key"]`.
    pub id: String,
    /// Lowercase flag asset key derived from `id`. See [`region_flag`].
    pub flag: String,
    /// ISO alpha-3 code, from `properties["iso-a3"]`. The map component
    /// joins this against `CurrentValueEntry::code3`.
    pub iso_a3: Option<String>,
    /// The full original record, augmented with `id` and `flag`.
    pub record: Value,
}

impl RegionRecord {
    /// Display name from the record's properties, when present.
    pub fn name(&self) -> Option<&str> {
        self.record
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
    }
}

/// Derive the flag asset key for a region key: the historical `UK`
/// spelling is rewritten to `GB` first so the key matches the lowercase
/// flag-asset naming convention, then the whole key is lowercased.
pub fn region_flag(region_key: &str) -> String {
    region_key.replacen("UK", "GB", 1).to_lowercase()
}

// ============================================================================
// Fetch
// ============================================================================

/// Fetch the topology document as JSON.
pub fn fetch_topology(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Value, Box<dyn Error>> {
    let response = client.get(url).header("Accept", "application/json").send()?;

    if !response.status().is_success() {
        return Err(Box::new(IngestError::HttpError(
            response.status().as_u16(),
        )));
    }

    let document = response
        .json::<Value>()
        .map_err(|e| IngestError::ParseError(e.to_string()))?;

    Ok(document)
}

// ============================================================================
// Extraction & annotation
// ============================================================================

/// Pull the raw region records out of a topology document.
///
/// Accepts either shape the published documents use: a GeoJSON
/// `features` array, or a TopoJSON `objects.<layer>.geometries` array
/// (first layer that has one). Anything else yields no records; the
/// document's internals are otherwise none of our business.
pub fn extract_regions(document: &Value) -> Vec<Value> {
    if let Some(features) = document.get("features").and_then(|f| f.as_array()) {
        return features.clone();
    }

    if let Some(objects) = document.get("objects").and_then(|o| o.as_object()) {
        for layer in objects.values() {
            if let Some(geometries) = layer.get("geometries").and_then(|g| g.as_array()) {
                return geometries.clone();
            }
        }
    }

    Vec::new()
}

/// Annotate raw region records with `id`, `flag`, and the join key.
///
/// Runs once, immediately after extraction. Records without an `hc-key`
/// property cannot be addressed by the map component and are skipped.
pub fn annotate_regions(raw_records: Vec<Value>) -> Vec<RegionRecord> {
    let mut regions = Vec::with_capacity(raw_records.len());

    for mut record in raw_records {
        let Some(region_key) = record
            .get("properties")
            .and_then(|p| p.get("hc-key"))
            .and_then(|k| k.as_str())
            .map(String::from)
        else {
            logging::debug(
                DataSource::MapData,
                None,
                "skipping region record without an hc-key property",
            );
            continue;
        };

        let iso_a3 = record
            .get("properties")
            .and_then(|p| p.get("iso-a3"))
            .and_then(|c| c.as_str())
            .map(String::from);

        let flag = region_flag(&region_key);

        if let Some(map) = record.as_object_mut() {
            map.insert("id".to_string(), Value::String(region_key.clone()));
            map.insert("flag".to_string(), Value::String(flag.clone()));
        }

        regions.push(RegionRecord {
            id: region_key,
            flag,
            iso_a3,
            record,
        });
    }

    regions
}

// ============================================================================
// Tests
// ============================================================================
