/// Derivation layer between ingest output and the chart inputs.
///
/// Submodules:
/// - `joining` - derives the per-country current-value dataset that
///   drives the map's color-scaled series.

pub mod joining;
