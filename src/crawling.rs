//! Crawling module
//!
//! - `session`: crawl one city on an open page and assemble its record
//! - `orchestrator`: drive every city through its own browser session and persist the results

pub mod orchestrator;
pub mod session;

pub use orchestrator::{RunOrchestrator, RunReport, SkippedCity};
pub use session::{CrawlError, PageSessionDriver, assemble_record};
