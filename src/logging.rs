/// Structured logging for the population map service.
///
/// Provides context-rich logging tagged with the data source and an
/// optional entity identifier (a country code or region key), with
/// timestamps and severity levels. Supports console output and an
/// optional log file for unattended runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The World Bank population-history CSV export.
    WorldBank,
    /// The world topology document behind the map geometry.
    MapData,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::WorldBank => write!(f, "WB"),
            DataSource::MapData => write!(f, "MAP"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - a country row with no data, a region without a
    /// join key. The export genuinely contains these.
    Expected,
    /// Unexpected failure - indicates an endpoint outage or a format change
    /// in the published export.
    Unexpected,
    /// Unknown - cannot determine if this is expected or not.
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: &DataSource, entity_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let entity_part = entity_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, entity_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, entity_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, entity_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, entity_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &source, entity_id, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, entity_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &source, entity_id, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, entity_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &source, entity_id, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, entity_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &source, entity_id, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a population-export failure based on the error message.
pub fn classify_worldbank_failure(error_message: &str) -> FailureType {
    // Header errors mean the published export format changed under us
    if error_message.contains("header") || error_message.contains("Parse error") {
        FailureType::Unexpected
    } else if error_message.contains("HTTP error") {
        FailureType::Unexpected
    } else if error_message.contains("no data") {
        FailureType::Expected
    } else {
        FailureType::Unknown
    }
}

/// Classify a topology-endpoint failure.
pub fn classify_mapdata_failure(error_message: &str) -> FailureType {
    if error_message.contains("HTTP error") || error_message.contains("timeout") {
        FailureType::Unexpected
    } else if error_message.contains("Parse error") {
        FailureType::Unexpected
    } else if error_message.contains("no regions") {
        FailureType::Unknown
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a population-export failure with automatic classification.
pub fn log_worldbank_failure(operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_worldbank_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::WorldBank, None, &message),
        FailureType::Unexpected => error(DataSource::WorldBank, None, &message),
        FailureType::Unknown => warn(DataSource::WorldBank, None, &message),
    }
}

/// Log a topology-endpoint failure with classification.
pub fn log_mapdata_failure(operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_mapdata_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::MapData, None, &message),
        FailureType::Unexpected => error(DataSource::MapData, None, &message),
        FailureType::Unknown => warn(DataSource::MapData, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Ingest Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a parse pass over the export.
pub fn log_parse_summary(countries: usize, categories: usize, skipped: usize, coerced: usize) {
    let message = format!(
        "Parse complete: {} countries across {} year columns ({} rows skipped, {} cells coerced)",
        countries, categories, skipped, coerced
    );

    if coerced == 0 && skipped == 0 {
        info(DataSource::WorldBank, None, &message);
    } else {
        warn(DataSource::WorldBank, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let header_error = "CSV header has 2 field(s); expected at least 4 metadata columns";
        let result = classify_worldbank_failure(header_error);
        assert_eq!(result, FailureType::Unexpected);

        let http_error = "HTTP error: 500";
        let result = classify_worldbank_failure(http_error);
        assert_eq!(result, FailureType::Unexpected);

        let no_data = "country row had no data cells";
        assert_eq!(classify_worldbank_failure(no_data), FailureType::Expected);
    }

    #[test]
    fn test_mapdata_classification_defaults_to_unknown() {
        assert_eq!(
            classify_mapdata_failure("something nobody anticipated"),
            FailureType::Unknown
        );
    }
}
