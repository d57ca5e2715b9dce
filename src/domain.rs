//! Domain module - cities, readings and measurement records
//!
//! Each module is its own file in the domain/ directory; public exports are
//! collected here for convenience.

pub mod city;
pub mod measurement;
pub mod pollutant;

pub use city::{CityDescriptor, default_cities};
pub use measurement::{
    MeasurementRecord, PollutantReadings, RECORD_HEADER, Reading, ict_now, ict_offset,
};
pub use pollutant::{PollutantKey, normalize_pollutant_name};
