//! Parsing and validation error types
//!
//! Two tiers: [`ValidationError`] says a raw field value was not acceptable and
//! always ends up as an absent reading; [`ParsingError`] says the DOM itself could
//! not be queried, which the caller decides how far to propagate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: no value")]
    Empty { field: &'static str },

    #[error("{field}: malformed value '{raw}'")]
    Malformed { field: &'static str, raw: String },

    #[error("{field}: value '{raw}' outside {range}")]
    OutOfRange {
        field: &'static str,
        raw: String,
        range: &'static str,
    },

    #[error("{field}: unsupported unit in '{raw}'")]
    UnsupportedUnit { field: &'static str, raw: String },
}

impl ValidationError {
    pub fn malformed(field: &'static str, raw: &str) -> Self {
        Self::Malformed {
            field,
            raw: raw.to_string(),
        }
    }

    pub fn out_of_range(field: &'static str, raw: &str, range: &'static str) -> Self {
        Self::OutOfRange {
            field,
            raw: raw.to_string(),
            range,
        }
    }
}

pub type ValidationResult = Result<String, ValidationError>;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("DOM query failed for '{selector}': {reason}")]
    QueryFailed { selector: String, reason: String },

    #[error("HTML parsing failed: {message}")]
    HtmlParsingFailed { message: String },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn query_failed(selector: &str, reason: impl std::fmt::Display) -> Self {
        Self::QueryFailed {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn html_parsing_failed(message: impl Into<String>) -> Self {
        Self::HtmlParsingFailed {
            message: message.into(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
