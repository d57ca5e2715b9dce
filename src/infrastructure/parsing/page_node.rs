//! Page query capability
//!
//! Extractors only ever ask four things of the page: find one element, find all
//! elements, read text, read an attribute. [`PageNode`] is that surface; the
//! production implementation sits on `scraper`'s DOM.

use scraper::{ElementRef, Selector};

use super::error::{ParsingError, ParsingResult};

pub trait PageNode: Sized {
    /// First descendant matching `selector`.
    fn find_one(&self, selector: &str) -> ParsingResult<Option<Self>>;

    /// Every descendant matching `selector`, in document order.
    fn find_all(&self, selector: &str) -> ParsingResult<Vec<Self>>;

    /// Concatenated text content, untrimmed.
    fn text(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// Text content with surrounding whitespace removed.
    fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

impl PageNode for ElementRef<'_> {
    fn find_one(&self, selector: &str) -> ParsingResult<Option<Self>> {
        let compiled = compile(selector)?;
        Ok(self.select(&compiled).next())
    }

    fn find_all(&self, selector: &str) -> ParsingResult<Vec<Self>> {
        let compiled = compile(selector)?;
        Ok(self.select(&compiled).collect())
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }
}
