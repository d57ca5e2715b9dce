//! Page session driver
//!
//! Crawls one city on an already opened page: navigate, wait for the network to
//! settle, snapshot the DOM and run every extractor over it. Only navigation
//! failures and a failed AQI query drop the record; any other extractor failure
//! degrades to absent values.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use scraper::Html;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::city::CityDescriptor;
use crate::domain::measurement::{MeasurementRecord, PollutantReadings, ict_now};
use crate::infrastructure::browser::{BrowserError, DashboardPage};
use crate::infrastructure::config::BrowserSettings;
use crate::infrastructure::parsing::{
    DashboardExtractor, PageNode, ParsingError, ParsingResult, WeatherComponents,
};

/// City-level failure. The city is skipped for this run.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("{source}")]
    Browser {
        city: String,
        #[source]
        source: BrowserError,
    },

    #[error("{source}")]
    Parsing {
        city: String,
        #[source]
        source: ParsingError,
    },

    #[error("Failed to save record: {message}")]
    Persist { city: String, message: String },
}

impl CrawlError {
    pub fn browser(city: &CityDescriptor, source: BrowserError) -> Self {
        Self::Browser {
            city: city.display_name.to_string(),
            source,
        }
    }

    pub fn parsing(city: &CityDescriptor, source: ParsingError) -> Self {
        Self::Parsing {
            city: city.display_name.to_string(),
            source,
        }
    }

    pub fn persist(city: &CityDescriptor, error: &anyhow::Error) -> Self {
        Self::Persist {
            city: city.display_name.to_string(),
            message: format!("{error:#}"),
        }
    }

    /// Display name of the affected city
    pub fn city(&self) -> &str {
        match self {
            Self::Browser { city, .. } | Self::Parsing { city, .. } | Self::Persist { city, .. } => {
                city
            }
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Browser { source, .. } if source.is_timeout())
    }
}

/// Crawls single city pages with a fixed navigation bound
#[derive(Debug, Clone)]
pub struct PageSessionDriver {
    extractor: Arc<DashboardExtractor>,
    timeout: Duration,
    idle_window: Duration,
}

impl PageSessionDriver {
    pub fn new(extractor: Arc<DashboardExtractor>, settings: &BrowserSettings) -> Self {
        Self {
            extractor,
            timeout: settings.navigation_timeout(),
            idle_window: settings.network_idle_window(),
        }
    }

    pub async fn crawl(
        &self,
        page: &mut dyn DashboardPage,
        city: &CityDescriptor,
    ) -> Result<MeasurementRecord, CrawlError> {
        info!("Accessing {} ({})...", city.display_name, city.url);

        page.goto(city.url, self.timeout)
            .await
            .map_err(|e| CrawlError::browser(city, e))?;
        page.wait_for_network_idle(self.timeout, self.idle_window)
            .await
            .map_err(|e| CrawlError::browser(city, e))?;
        let html = page
            .content()
            .await
            .map_err(|e| CrawlError::browser(city, e))?;

        self.extract(&html, city, ict_now())
            .map_err(|e| CrawlError::parsing(city, e))
    }

    /// Parse the rendered HTML and build the record. Kept synchronous: the DOM
    /// is not `Send` and must not live across an await.
    fn extract(
        &self,
        html: &str,
        city: &CityDescriptor,
        timestamp: DateTime<FixedOffset>,
    ) -> ParsingResult<MeasurementRecord> {
        if html.trim().is_empty() {
            return Err(ParsingError::html_parsing_failed("page rendered an empty document"));
        }
        let document = Html::parse_document(html);
        assemble_record(
            &self.extractor,
            &document.root_element(),
            city.display_name,
            timestamp,
        )
    }
}

/// Run every extractor over `root` and assemble one complete record.
///
/// A failed AQI query is returned as an error. Every other extractor failure is
/// logged and leaves its fields absent.
pub fn assemble_record<N: PageNode>(
    extractor: &DashboardExtractor,
    root: &N,
    city: &str,
    timestamp: DateTime<FixedOffset>,
) -> ParsingResult<MeasurementRecord> {
    let aqi = extractor.extract_aqi(root)?;

    let weather_condition = extractor.extract_weather_condition(root).unwrap_or_else(|e| {
        warn!("[{}] Error extracting weather condition: {}", city, e);
        Default::default()
    });
    let temperature = extractor.extract_temperature(root).unwrap_or_else(|e| {
        warn!("[{}] Error extracting temperature: {}", city, e);
        Default::default()
    });
    let components = extractor.extract_weather_components(root).unwrap_or_else(|e| {
        warn!("[{}] Error extracting weather components: {}", city, e);
        WeatherComponents::default()
    });
    let pollutants = extractor.extract_pollutants(root).unwrap_or_else(|e| {
        warn!("[{}] Error extracting pollutants: {}", city, e);
        PollutantReadings::new().completed()
    });

    Ok(MeasurementRecord {
        timestamp,
        city: city.to_string(),
        aqi,
        weather_condition,
        wind_speed: components.wind_speed,
        humidity: components.humidity,
        temperature,
        uv_index: components.uv_index,
        pollutants,
    })
}
