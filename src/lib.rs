//! AQI Crawler - air quality dashboard crawler
//!
//! Drives a headless browser over a fixed list of city dashboards, extracts and
//! validates the air quality and weather readings, and appends one CSV row per
//! city to a per-city, per-month file.

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub mod test_utils;

pub use crawling::{RunOrchestrator, RunReport};
pub use domain::{CityDescriptor, MeasurementRecord, default_cities};
