//! World population map dashboard data service.
//!
//! Fetches the world topology document and the World Bank
//! population-history CSV export, parses the export into per-country
//! time series, derives each country's most-recent-known population, and
//! assembles the declarative inputs consumed by the external map
//! charting component. Also provides the selection bridge that turns a
//! map-region selection into a historical chart model.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod selection;
pub mod verify;
