/// Development mode utilities for working with snapshot data.
///
/// When the live endpoints are unavailable, use this module to replay a
/// previously saved export and topology document from disk, so the parse
/// and join pipeline can be exercised offline.

use crate::model::IngestError;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

/// Snapshot file names expected inside the data directory.
pub const POPULATION_SNAPSHOT: &str = "world-population-history.csv";
pub const TOPOLOGY_SNAPSHOT: &str = "world-topology.json";

/// Configuration for development mode data replay.
#[derive(Debug, Clone)]
pub struct DevMode {
    /// Directory holding the snapshot files.
    pub data_dir: PathBuf,
}

impl DevMode {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// True when both snapshot files are present.
    pub fn snapshot_available(&self) -> bool {
        self.data_dir.join(POPULATION_SNAPSHOT).exists()
            && self.data_dir.join(TOPOLOGY_SNAPSHOT).exists()
    }

    /// Read the saved CSV export, standing in for the live fetch.
    pub fn load_population_csv(&self) -> std::io::Result<String> {
        fs::read_to_string(self.data_dir.join(POPULATION_SNAPSHOT))
    }

    /// Read and decode the saved topology document.
    pub fn load_topology(&self) -> Result<Value, Box<dyn Error>> {
        let text = fs::read_to_string(self.data_dir.join(TOPOLOGY_SNAPSHOT))?;
        let document = serde_json::from_str(&text)
            .map_err(|e| IngestError::ParseError(e.to_string()))?;
        Ok(document)
    }
}
