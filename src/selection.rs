/// Selection-to-history bridge.
///
/// Translates a user's map-region selection into the side info panel's
/// model and the historical population chart's series list. The charting
/// component reports every selection-count change through an injected
/// callback (`SelectionContext::on_selection_changed`); nothing here
/// intercepts or wraps component internals.
///
/// Presentation rules, per selection count:
/// - one region: the country's flag and name, one filled-area series;
/// - several regions: a comparison heading, one line series per region;
/// - none: all derived state is torn down.

use crate::ingest::mapdata::RegionRecord;
use crate::logging::{self, DataSource};
use crate::model::PopulationTable;

pub const COMPARE_HEADING: &str = "Comparing countries";
pub const SUBHEADER: &str = "Historical population";

// ---------------------------------------------------------------------------
// Selection input
// ---------------------------------------------------------------------------

/// One selected map region, as reported by the charting component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRegion {
    pub name: String,
    pub code3: String,
    pub flag: String,
}

impl SelectedRegion {
    /// Build a selection from an annotated region record. `None` when the
    /// region lacks a display name or a join key, in which case there is
    /// no country series to bridge to.
    pub fn from_region(region: &RegionRecord) -> Option<Self> {
        let name = region.name()?.to_string();
        let code3 = region.iso_a3.clone()?;
        Some(SelectedRegion {
            name,
            code3,
            flag: region.flag.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Derived models
// ---------------------------------------------------------------------------

/// Info panel model. All fields empty on teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPanel {
    /// CSS-style asset class for the flag slot: `"flag fr"` for a single
    /// selection, bare `"flag"` when comparing, empty on teardown.
    pub flag_class: String,
    pub heading: String,
    pub subheader: String,
}

impl InfoPanel {
    fn cleared() -> Self {
        InfoPanel {
            flag_class: String::new(),
            heading: String::new(),
            subheader: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Single selection renders filled.
    Area,
    /// Multi-selection renders overlaid lines.
    Line,
}

/// One chartable series for a selected region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySeries {
    pub name: String,
    pub data: Vec<Option<u64>>,
    pub kind: SeriesKind,
}

/// The historical chart model for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryChart {
    /// Numeric x-axis start: the first shared category parsed as a year.
    /// Categories are contiguous years, so the series index the rest.
    pub point_start: Option<i64>,
    pub series: Vec<HistorySeries>,
    /// Whether a chart instance already existed and was rebuilt, as
    /// opposed to created fresh for this selection.
    pub rebuilt: bool,
}

/// Everything the presentation layer needs after a selection change.
/// `chart` is `None` on teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub panel: InfoPanel,
    pub chart: Option<HistoryChart>,
}

// ---------------------------------------------------------------------------
// Selection context
// ---------------------------------------------------------------------------

/// Process-wide dashboard state scoped to the page lifetime: the retained
/// country table and the secondary chart's lifecycle flag. Owned
/// explicitly and passed to the selection callback rather than living in
/// free-floating mutable bindings.
#[derive(Debug)]
pub struct SelectionContext {
    table: PopulationTable,
    chart_active: bool,
}

impl SelectionContext {
    pub fn new(table: PopulationTable) -> Self {
        SelectionContext {
            table,
            chart_active: false,
        }
    }

    /// The retained table, for consumers that need to re-read a series.
    pub fn table(&self) -> &PopulationTable {
        &self.table
    }

    /// Selection-changed callback. Called by the charting component with
    /// the full current selection on every selection-count change.
    pub fn on_selection_changed(&mut self, selected: &[SelectedRegion]) -> SelectionUpdate {
        if selected.is_empty() {
            self.chart_active = false;
            return SelectionUpdate {
                panel: InfoPanel::cleared(),
                chart: None,
            };
        }

        let panel = if selected.len() == 1 {
            InfoPanel {
                flag_class: format!("flag {}", selected[0].flag),
                heading: selected[0].name.clone(),
                subheader: SUBHEADER.to_string(),
            }
        } else {
            InfoPanel {
                flag_class: "flag".to_string(),
                heading: COMPARE_HEADING.to_string(),
                subheader: SUBHEADER.to_string(),
            }
        };

        let kind = if selected.len() > 1 {
            SeriesKind::Line
        } else {
            SeriesKind::Area
        };

        let series: Vec<HistorySeries> = selected
            .iter()
            .filter_map(|region| match self.table.get(&region.code3) {
                Some(record) => Some(HistorySeries {
                    name: region.name.clone(),
                    data: record.series.clone(),
                    kind,
                }),
                None => {
                    logging::debug(
                        DataSource::System,
                        Some(&region.code3),
                        "selected region has no entry in the population table",
                    );
                    None
                }
            })
            .collect();

        let point_start = self
            .table
            .categories
            .first()
            .and_then(|year| year.trim().parse::<i64>().ok());

        let rebuilt = self.chart_active;
        self.chart_active = true;

        SelectionUpdate {
            panel,
            chart: Some(HistoryChart {
                point_start,
                series,
                rebuilt,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
