/// Ingest clients for the dashboard's two remote inputs.
///
/// Submodules:
/// - `worldbank` - the population-history CSV export and its parser.
/// - `mapdata` - the world topology document and region annotation.

pub mod mapdata;
pub mod worldbank;
