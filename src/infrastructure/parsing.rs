//! HTML extraction for the air quality dashboard
//!
//! The browser hands over a DOM snapshot once the network has settled. Everything
//! below works on that snapshot through the [`PageNode`] capability, so extractors
//! run the same against a live page, a fixture document or a fault-injecting fake.

pub mod config;
pub mod error;
pub mod extractors;
pub mod page_node;
pub mod validators;

// Re-export public types
pub use config::DashboardSelectors;
pub use error::{ParsingError, ParsingResult, ValidationError, ValidationResult};
pub use extractors::{DashboardExtractor, WeatherComponents};
pub use page_node::PageNode;
