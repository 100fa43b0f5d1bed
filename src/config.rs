/// Endpoint configuration for the dashboard's two data fetches.
///
/// The defaults are the published URLs the dashboard was built against.
/// Both can be overridden through an optional `popmap.toml` next to the
/// binary, and again through environment variables (loaded via dotenv by
/// the binary before this module runs), in that precedence order:
/// defaults < file < environment.

use crate::logging::{self, DataSource};
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// World topology document consumed opaquely by the map component.
pub const DEFAULT_TOPOLOGY_URL: &str =
    "https://code.highcharts.com/mapdata/custom/world.topo.json";

/// World Bank population-history CSV export.
pub const DEFAULT_POPULATION_CSV_URL: &str =
    "https://cdn.jsdelivr.net/gh/highcharts/highcharts@v7.0.0/samples/data/world-population-history.csv";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional configuration file, read from the working directory.
pub const CONFIG_FILE: &str = "popmap.toml";

// ---------------------------------------------------------------------------
// Endpoint configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub topology_url: String,
    pub population_csv_url: String,
    /// Per-request timeout applied to the HTTP client.
    pub timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            topology_url: DEFAULT_TOPOLOGY_URL.to_string(),
            population_csv_url: DEFAULT_POPULATION_CSV_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk representation: every key optional, missing keys keep defaults.
#[derive(Debug, Deserialize)]
struct FileConfig {
    topology_url: Option<String>,
    population_csv_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Endpoints {
    /// Load configuration with full precedence: defaults, then
    /// `popmap.toml` if present, then environment variables.
    pub fn load() -> Self {
        let mut endpoints = match Self::from_file(Path::new(CONFIG_FILE)) {
            Ok(Some(e)) => e,
            Ok(None) => Endpoints::default(),
            Err(err) => {
                logging::warn(
                    DataSource::System,
                    None,
                    &format!("could not read {}: {} (using defaults)", CONFIG_FILE, err),
                );
                Endpoints::default()
            }
        };
        endpoints.apply_overrides(
            env::var("POPMAP_TOPOLOGY_URL").ok(),
            env::var("POPMAP_POPULATION_CSV_URL").ok(),
            env::var("POPMAP_TIMEOUT_SECS").ok(),
        );
        endpoints
    }

    /// Read a configuration file. `Ok(None)` when the file does not exist.
    fn from_file(path: &Path) -> Result<Option<Endpoints>, Box<dyn Error>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&text)?;
        let defaults = Endpoints::default();
        Ok(Some(Endpoints {
            topology_url: file.topology_url.unwrap_or(defaults.topology_url),
            population_csv_url: file
                .population_csv_url
                .unwrap_or(defaults.population_csv_url),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }))
    }

    /// Apply environment-shaped overrides. Split out from `load` so the
    /// precedence rules are testable without touching the process
    /// environment.
    fn apply_overrides(
        &mut self,
        topology_url: Option<String>,
        population_csv_url: Option<String>,
        timeout_secs: Option<String>,
    ) {
        if let Some(url) = topology_url {
            self.topology_url = url;
        }
        if let Some(url) = population_csv_url {
            self.population_csv_url = url;
        }
        if let Some(raw) = timeout_secs {
            match raw.parse::<u64>() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => logging::warn(
                    DataSource::System,
                    None,
                    &format!("POPMAP_TIMEOUT_SECS={:?} is not a number, keeping {}", raw, self.timeout_secs),
                ),
            }
        }
    }

    /// Build the blocking HTTP client both fetches share.
    pub fn http_client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
