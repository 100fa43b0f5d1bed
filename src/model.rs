/// Core data types for the world population map service.
///
/// This module defines the shared domain model imported by all other
/// modules. It contains no logic and no I/O, only types and the CSV
/// layout constants that every consumer of the World Bank export agrees on.

use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// CSV layout constants
// ---------------------------------------------------------------------------

/// 0-based line index of the header row in the World Bank export.
/// Lines 0 and 1 are preamble and carry no data.
pub const HEADER_LINE: usize = 2;

/// Number of leading metadata columns in every row: country name,
/// alpha-3 code, indicator name, indicator code. Columns from this
/// offset onward are one population value per year.
pub const META_COLUMNS: usize = 4;

// ---------------------------------------------------------------------------
// Country types
// ---------------------------------------------------------------------------

/// One country's population time series, parsed from a single CSV row.
///
/// `series` is positionally aligned with the shared category (year) list
/// held by the enclosing `PopulationTable`: `series[i]` is the population
/// for `categories[i]`, or `None` where the export had no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    /// Human-readable country name (source column 0).
    pub display_name: String,
    /// ISO 3166-1 alpha-3 country code (source column 1). Unique key.
    pub code3: String,
    /// One entry per year category. `None` marks an empty, malformed, or
    /// truncated cell; `Some` is a non-negative population count.
    pub series: Vec<Option<u64>>,
}

/// The parse result for a whole export: the shared year labels plus every
/// country keyed by alpha-3 code.
///
/// Built once at startup and held for the process lifetime so a later map
/// selection can re-read a country's full series without re-fetching.
/// Invariant: `series.len() == categories.len()` for every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopulationTable {
    /// Ordered year labels, derived once from the header row.
    pub categories: Vec<String>,
    /// Per-country records, keyed by `code3`.
    pub countries: BTreeMap<String, CountryRecord>,
}

impl PopulationTable {
    /// Looks up a country by alpha-3 code. Returns `None` if not present.
    pub fn get(&self, code3: &str) -> Option<&CountryRecord> {
        self.countries.get(code3)
    }

    /// Number of countries in the table.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Derived map dataset
// ---------------------------------------------------------------------------

/// A country's most-recent-known population measurement, derived for map
/// shading.
///
/// `value` and `year` come from the highest-index non-null position in the
/// country's series: the latest recorded measurement, not necessarily the
/// last column. Both are `None` iff the entire series is null.
///
/// Serialized into the map chart configuration's `series[0].data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentValueEntry {
    pub name: String,
    pub code3: String,
    pub value: Option<u64>,
    pub year: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or parsing the dashboard's inputs.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestError {
    /// Non-2xx HTTP response from a data endpoint.
    HttpError(u16),
    /// The response body could not be decoded or deserialized.
    ParseError(String),
    /// The CSV payload has too few lines to contain a header row.
    MissingHeader { lines: usize },
    /// The header row has fewer fields than the metadata column offset,
    /// so no year categories can be derived from it.
    HeaderTooShort { fields: usize },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::HttpError(code) => write!(f, "HTTP error: {}", code),
            IngestError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            IngestError::MissingHeader { lines } => {
                write!(
                    f,
                    "CSV payload has {} line(s); header expected at line index {}",
                    lines, HEADER_LINE
                )
            }
            IngestError::HeaderTooShort { fields } => {
                write!(
                    f,
                    "CSV header has {} field(s); expected at least {} metadata columns",
                    fields, META_COLUMNS
                )
            }
        }
    }
}

impl std::error::Error for IngestError {}
