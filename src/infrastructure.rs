//! Infrastructure layer for configuration, logging, the headless browser,
//! HTML extraction and CSV output.

pub mod browser; // Headless browser capability + chromiumoxide backend
pub mod config; // Configuration loading and defaults
pub mod csv_sink; // Per-city, per-month CSV files
pub mod logging; // Logging infrastructure
pub mod parsing; // DOM queries, field validators and extractors

pub use browser::{
    BrowserError, BrowserLauncher, BrowserResult, BrowserSession, ChromiumLauncher, DashboardPage,
    Viewport,
};
pub use config::AppConfig;
pub use csv_sink::CsvSink;
pub use parsing::{DashboardSelectors, ParsingError, ParsingResult, ValidationError};
