/// World Bank population-history export client and parser.
///
/// Retrieves the population-history CSV export and parses it into a
/// `PopulationTable`: the shared year categories from the header row plus
/// one time series per country, keyed by alpha-3 code.
///
/// The export format is fixed: lines 0-1 are preamble, line 2 is the
/// header, lines 3+ are data rows. Fields are quote-wrapped and separated
/// by commas inside the quoting (`"a","b","c",`). Columns 0-3 are
/// metadata; columns 4+ carry one value per year.
///
/// Parsing is deliberately lenient, matching the controlled, versioned
/// nature of the export: short rows pad out with absent values, and the
/// only hard failure is a missing or truncated header row.

use crate::logging::{self, DataSource};
use crate::model::{CountryRecord, IngestError, PopulationTable, HEADER_LINE, META_COLUMNS};
use std::error::Error;

// ============================================================================
// Fetch
// ============================================================================

/// Fetch the raw CSV text from the export endpoint.
///
/// A non-2xx status or an unreadable body is returned as an error; there
/// is no retry. The caller treats a failed fetch as fatal to dashboard
/// initialization.
pub fn fetch_population_csv(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<String, Box<dyn Error>> {
    let response = client.get(url).send()?;

    if !response.status().is_success() {
        return Err(Box::new(IngestError::HttpError(
            response.status().as_u16(),
        )));
    }

    Ok(response.text()?)
}

// ============================================================================
// Row splitting
// ============================================================================

/// Split one quote-wrapped export line into raw fields.
///
/// Strips a single leading quote, then either a trailing `",` (the
/// export's usual trailing-comma artifact) or a lone trailing quote, and
/// splits on the literal `","` sequence. Only handles the export's exact
/// quoting convention; this is not a general CSV reader.
fn split_quoted_row(line: &str) -> Vec<&str> {
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = match line.strip_suffix("\",") {
        Some(stripped) => stripped,
        None => line.strip_suffix('"').unwrap_or(line),
    };
    line.split("\",\"").collect()
}

// ============================================================================
// Cell classification
// ============================================================================

/// What a single data cell turned out to hold.
enum Cell {
    /// A parsed population count.
    Number(u64),
    /// Empty cell, or the comma-plus-whitespace tail of a truncated row.
    Absent,
    /// Anything else. Coerced to absent, but reported so format drift in
    /// the export does not vanish silently.
    Coerced(String),
}

/// True when the stripped cell consists solely of digits and dots,
/// the shape the export uses for numeric values.
fn is_numeric_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// True for cells ending in a comma followed by one whitespace character,
/// an artifact of malformed trailing fields in truncated rows.
fn is_trailing_comma_artifact(cell: &str) -> bool {
    let mut rev = cell.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some(ws), Some(',')) if ws.is_whitespace()
    )
}

/// Parse the leading digit run of a numeric cell as a base-10 integer.
/// `"1234.5"` parses as 1234; a cell with no leading digits has no value.
fn leading_digits(cell: &str) -> Option<u64> {
    let end = cell
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(cell.len());
    cell[..end].parse().ok()
}

fn classify_cell(raw: &str) -> Cell {
    let cell: String = raw.chars().filter(|&c| c != '"').collect();

    if is_numeric_cell(&cell) {
        match leading_digits(&cell) {
            Some(value) => Cell::Number(value),
            // All-dots cells pass the numeric shape test but hold nothing
            None => Cell::Coerced(cell),
        }
    } else if cell.is_empty() || is_trailing_comma_artifact(&cell) {
        Cell::Absent
    } else {
        Cell::Coerced(cell)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse the raw export text into a `PopulationTable`.
///
/// Pure given its input: the same text always produces a value-equal
/// table. The header row must exist and carry at least the metadata
/// columns; everything below that is lenient. Rows too short to contain a
/// country code are skipped, and every stored series is padded or
/// truncated to the category count so positional alignment always holds.
pub fn parse_population_csv(text: &str) -> Result<PopulationTable, IngestError> {
    let lines: Vec<&str> = text.split('\n').collect();

    if lines.len() <= HEADER_LINE {
        return Err(IngestError::MissingHeader { lines: lines.len() });
    }

    let header = split_quoted_row(lines[HEADER_LINE]);
    if header.len() < META_COLUMNS {
        return Err(IngestError::HeaderTooShort {
            fields: header.len(),
        });
    }

    let categories: Vec<String> = header[META_COLUMNS..]
        .iter()
        .map(|field| field.to_string())
        .collect();

    let mut table = PopulationTable {
        categories,
        countries: Default::default(),
    };
    let mut skipped = 0usize;
    let mut coerced = 0usize;

    for line in &lines[HEADER_LINE + 1..] {
        let fields = split_quoted_row(line);

        // Without at least name and code there is nothing to key the row under
        if fields.len() < 2 {
            logging::debug(
                DataSource::WorldBank,
                None,
                &format!("skipping row with {} field(s): {:?}", fields.len(), line),
            );
            skipped += 1;
            continue;
        }

        let display_name = fields[0].to_string();
        let code3 = fields[1].to_string();

        let mut series: Vec<Option<u64>> = fields[META_COLUMNS.min(fields.len())..]
            .iter()
            .map(|raw| match classify_cell(raw) {
                Cell::Number(value) => Some(value),
                Cell::Absent => None,
                Cell::Coerced(cell) => {
                    logging::warn(
                        DataSource::WorldBank,
                        Some(&code3),
                        &format!("non-numeric population cell {:?} coerced to absent", cell),
                    );
                    coerced += 1;
                    None
                }
            })
            .collect();

        // series[i] must always pair with categories[i]
        series.resize(table.categories.len(), None);

        table.countries.insert(
            code3.clone(),
            CountryRecord {
                display_name,
                code3,
                series,
            },
        );
    }

    logging::log_parse_summary(table.len(), table.categories.len(), skipped, coerced);

    Ok(table)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// A miniature export in the real format: two preamble lines, a
    /// quote-wrapped header with four metadata columns, then data rows.
    fn sample_export() -> String {
        [
            "\"Data Source\",\"World Development Indicators\",",
            "\"Last Updated Date\",\"2017-01-01\",",
            "\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"1960\",\"1961\",\"1962\",\"1963\",",
            "\"France\",\"FRA\",\"Population, total\",\"SP.POP.TOTL\",\"46621669\",\"47280380\",\"47994795\",\"48680405\",",
            "\"Aruba\",\"ABW\",\"Population, total\",\"SP.POP.TOTL\",\"54211\",\"\",\"56695\",\"\",",
            "\"Not Classified\",\"INX\",\"Population, total\",\"SP.POP.TOTL\",\"\",\"\",\"\",\"\",",
        ]
        .join("\n")
    }

    #[test]
    fn test_header_categories_extracted_after_metadata_offset() {
        let table = parse_population_csv(&sample_export()).expect("sample should parse");
        assert_eq!(table.categories, vec!["1960", "1961", "1962", "1963"]);
    }

    #[test]
    fn test_header_without_trailing_comma_still_parses_clean() {
        let text = "\npreamble\n\"NAME\",\"CODE\",\"X\",\"Y\",\"1960\",\"1961\"";
        let table = parse_population_csv(text).expect("header-only payload should parse");
        assert_eq!(table.categories, vec!["1960", "1961"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_numeric_row_parses_to_series() {
        let table = parse_population_csv(&sample_export()).expect("sample should parse");
        let france = table.get("FRA").expect("France should be present");
        assert_eq!(france.display_name, "France");
        assert_eq!(france.code3, "FRA");
        assert_eq!(
            france.series,
            vec![
                Some(46_621_669),
                Some(47_280_380),
                Some(47_994_795),
                Some(48_680_405)
            ]
        );
    }

    #[test]
    fn test_empty_cells_are_absent_not_zero() {
        let table = parse_population_csv(&sample_export()).expect("sample should parse");
        let aruba = table.get("ABW").expect("Aruba should be present");
        assert_eq!(aruba.series, vec![Some(54_211), None, Some(56_695), None]);
    }

    #[test]
    fn test_trailing_comma_artifact_cell_is_absent() {
        match classify_cell("1234, ") {
            Cell::Absent => {}
            Cell::Number(n) => panic!("artifact cell parsed as number {}", n),
            Cell::Coerced(s) => panic!("artifact cell coerced: {:?}", s),
        }
    }

    #[test]
    fn test_decimal_cell_parses_leading_digits() {
        match classify_cell("\"1234.5\"") {
            Cell::Number(n) => assert_eq!(n, 1234),
            _ => panic!("decimal cell should parse its leading digit run"),
        }
    }

    #[test]
    fn test_all_dots_cell_is_coerced() {
        assert!(matches!(classify_cell("..."), Cell::Coerced(_)));
    }

    #[test]
    fn test_textual_cell_is_coerced() {
        assert!(matches!(classify_cell("\"n/a\""), Cell::Coerced(_)));
    }

    #[test]
    fn test_short_row_pads_series_to_category_count() {
        let text = format!(
            "{}\n\"Shortland\",\"SHL\",\"Population, total\",\"SP.POP.TOTL\",\"100\",",
            sample_export()
        );
        let table = parse_population_csv(&text).expect("sample should parse");
        let short = table.get("SHL").expect("short row should be stored");
        assert_eq!(short.series.len(), table.categories.len());
        assert_eq!(short.series, vec![Some(100), None, None, None]);
    }

    #[test]
    fn test_trailing_blank_line_is_skipped() {
        let text = format!("{}\n", sample_export());
        let table = parse_population_csv(&text).expect("sample should parse");
        assert_eq!(table.len(), 3);
        assert!(!table.countries.contains_key(""));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let result = parse_population_csv("only one line");
        assert_eq!(result, Err(IngestError::MissingHeader { lines: 1 }));
    }

    #[test]
    fn test_short_header_is_an_error() {
        let text = "preamble\npreamble\n\"NAME\",\"CODE\",";
        let result = parse_population_csv(text);
        assert_eq!(result, Err(IngestError::HeaderTooShort { fields: 2 }));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = sample_export();
        let first = parse_population_csv(&text).expect("first parse");
        let second = parse_population_csv(&text).expect("second parse");
        assert_eq!(first, second, "same text must yield value-equal tables");
    }

    #[test]
    fn test_split_quoted_row_matches_export_quoting() {
        assert_eq!(
            split_quoted_row("\"France\",\"FRA\",\"X\",\"Y\",\"1000\",\"2000\","),
            vec!["France", "FRA", "X", "Y", "1000", "2000"]
        );
    }
}
