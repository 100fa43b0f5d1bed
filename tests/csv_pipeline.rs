//! End-to-end pipeline tests over a fixture export.
//!
//! Exercises the full offline path: raw CSV text → parsed table →
//! current-value derivation → chart configuration → selection bridge,
//! without touching the network.

use popmap_service::analysis::joining;
use popmap_service::chart;
use popmap_service::ingest::{mapdata, worldbank};
use popmap_service::selection::{SelectedRegion, SelectionContext, SeriesKind};
use serde_json::json;

/// A miniature export in the published format. Bulgaria's 1963 cell is
/// empty so its latest known value comes from 1962, and "No Data Land"
/// never reports at all.
fn fixture_csv() -> String {
    [
        "\"Data Source\",\"World Development Indicators\",",
        "\"Last Updated Date\",\"2017-01-01\",",
        "\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"1960\",\"1961\",\"1962\",\"1963\",",
        "\"United States\",\"USA\",\"Population, total\",\"SP.POP.TOTL\",\"180671000\",\"183691000\",\"186538000\",\"189242000\",",
        "\"United Kingdom\",\"GBR\",\"Population, total\",\"SP.POP.TOTL\",\"52400000\",\"52800000\",\"53250000\",\"53650000\",",
        "\"Bulgaria\",\"BGR\",\"Population, total\",\"SP.POP.TOTL\",\"7867374\",\"7943118\",\"8012946\",\"\",",
        "\"No Data Land\",\"NDL\",\"Population, total\",\"SP.POP.TOTL\",\"\",\"\",\"\",\"\",",
    ]
    .join("\n")
}

fn fixture_topology() -> serde_json::Value {
    json!({
        "type": "Topology",
        "objects": {
            "default": {
                "geometries": [
                    { "properties": { "hc-key": "us", "iso-a3": "USA", "name": "United States" } },
                    { "properties": { "hc-key": "UK", "iso-a3": "GBR", "name": "United Kingdom" } },
                    { "properties": { "hc-key": "bg", "iso-a3": "BGR", "name": "Bulgaria" } }
                ]
            }
        }
    })
}

#[test]
fn pipeline_builds_map_config_from_raw_inputs() {
    let table = worldbank::parse_population_csv(&fixture_csv()).expect("fixture parses");
    assert_eq!(table.categories, vec!["1960", "1961", "1962", "1963"]);
    assert_eq!(table.len(), 4);

    let regions = mapdata::annotate_regions(mapdata::extract_regions(&fixture_topology()));
    assert_eq!(regions.len(), 3);

    let entries = joining::current_values(&table);
    let config = chart::build_map_chart(entries, &regions);

    let series = &config.series[0];
    assert_eq!(series.join_by, ["iso-a3", "code3"]);
    assert_eq!(series.data.len(), 4, "every country emits an entry");
    assert_eq!(series.map_data.len(), 3);
}

#[test]
fn pipeline_derives_latest_known_values() {
    let table = worldbank::parse_population_csv(&fixture_csv()).expect("fixture parses");
    let entries = joining::current_values(&table);

    // fully populated series: last column wins
    let usa = entries.iter().find(|e| e.code3 == "USA").expect("USA entry");
    assert_eq!(usa.value, Some(189_242_000));
    assert_eq!(usa.year.as_deref(), Some("1963"));

    // trailing empty cell: latest known measurement wins, not last column
    let bgr = entries.iter().find(|e| e.code3 == "BGR").expect("BGR entry");
    assert_eq!(bgr.value, Some(8_012_946));
    assert_eq!(bgr.year.as_deref(), Some("1962"));

    // never reported: present with explicit nulls
    let ndl = entries.iter().find(|e| e.code3 == "NDL").expect("NDL entry");
    assert_eq!(ndl.value, None);
    assert_eq!(ndl.year, None);
}

#[test]
fn pipeline_normalizes_legacy_region_keys() {
    let regions = mapdata::annotate_regions(mapdata::extract_regions(&fixture_topology()));

    let uk = regions.iter().find(|r| r.id == "UK").expect("UK region");
    assert_eq!(uk.flag, "gb", "UK rewrites to GB before lowercasing");

    let us = regions.iter().find(|r| r.id == "us").expect("us region");
    assert_eq!(us.flag, "us");
}

#[test]
fn pipeline_selection_bridge_follows_selection_count() {
    let table = worldbank::parse_population_csv(&fixture_csv()).expect("fixture parses");
    let regions = mapdata::annotate_regions(mapdata::extract_regions(&fixture_topology()));
    let mut context = SelectionContext::new(table);

    let us = SelectedRegion::from_region(
        regions.iter().find(|r| r.id == "us").expect("us region"),
    )
    .expect("us is selectable");
    let uk = SelectedRegion::from_region(
        regions.iter().find(|r| r.id == "UK").expect("UK region"),
    )
    .expect("UK is selectable");

    // one region: filled area, flag shown
    let single = context.on_selection_changed(std::slice::from_ref(&us));
    assert_eq!(single.panel.flag_class, "flag us");
    assert_eq!(single.panel.heading, "United States");
    let chart = single.chart.expect("chart model");
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].kind, SeriesKind::Area);
    assert_eq!(chart.point_start, Some(1960));

    // two regions: overlaid lines, comparison heading
    let multi = context.on_selection_changed(&[us.clone(), uk]);
    assert_eq!(multi.panel.heading, "Comparing countries");
    let chart = multi.chart.expect("chart model");
    assert_eq!(chart.series.len(), 2);
    assert!(chart.series.iter().all(|s| s.kind == SeriesKind::Line));
    assert!(chart.rebuilt);

    // zero regions: teardown
    let cleared = context.on_selection_changed(&[]);
    assert!(cleared.chart.is_none());
    assert_eq!(cleared.panel.heading, "");
    assert_eq!(cleared.panel.flag_class, "");
}

#[test]
fn pipeline_parse_is_stable_across_runs() {
    let text = fixture_csv();
    let first = worldbank::parse_population_csv(&text).expect("first parse");
    let second = worldbank::parse_population_csv(&text).expect("second parse");
    assert_eq!(first, second);
}

#[test]
fn pipeline_serialized_config_keeps_nulls_for_missing_data() {
    let table = worldbank::parse_population_csv(&fixture_csv()).expect("fixture parses");
    let regions = mapdata::annotate_regions(mapdata::extract_regions(&fixture_topology()));
    let config = chart::build_map_chart(joining::current_values(&table), &regions);

    let value = serde_json::to_value(&config).expect("config serializes");
    let data = value["series"][0]["data"].as_array().expect("data array");

    let ndl = data
        .iter()
        .find(|e| e["code3"] == "NDL")
        .expect("no-data country serialized");
    assert!(ndl["value"].is_null());
    assert!(ndl["year"].is_null());
}
