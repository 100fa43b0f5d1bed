/// Current-value derivation for the map series.
///
/// For each country in the parsed table, the "current" population is the
/// most recent known measurement: the series is scanned from the last
/// year backward and the first non-null value wins, together with its
/// paired year label. The geometric join itself (`iso-a3` against
/// `code3`) is declared in the chart configuration and performed by the
/// map component; derivation here is independent of join success, so
/// countries without geometry still get an entry and regions without
/// data render as "no data" rather than erroring.

use crate::model::{CountryRecord, CurrentValueEntry, PopulationTable};

/// Scan a series backward for the latest non-null value and its paired
/// category label. `(None, None)` when the series holds no data at all.
pub fn latest_value(
    record: &CountryRecord,
    categories: &[String],
) -> (Option<u64>, Option<String>) {
    for i in (0..record.series.len()).rev() {
        if let Some(value) = record.series[i] {
            return (Some(value), categories.get(i).cloned());
        }
    }
    (None, None)
}

/// Derive one `CurrentValueEntry` per country in the table.
///
/// Emitted for every country regardless of whether a geometry match
/// exists downstream. Iteration order follows the table's key order;
/// consumers join by key, not position.
pub fn current_values(table: &PopulationTable) -> Vec<CurrentValueEntry> {
    let mut entries = Vec::with_capacity(table.len());

    for record in table.countries.values() {
        let (value, year) = latest_value(record, &table.categories);
        entries.push(CurrentValueEntry {
            name: record.display_name.clone(),
            code3: record.code3.clone(),
            value,
            year,
        });
    }

    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
