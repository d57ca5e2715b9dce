//! # Run Orchestrator
//!
//! Drives the city list through the page session driver. Each city gets its own
//! browser session, which is always closed again. A city that fails is logged
//! and skipped; the run carries on with the next one.

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tracing::{error, info, warn};

use super::session::{CrawlError, PageSessionDriver};
use crate::domain::city::CityDescriptor;
use crate::domain::measurement::MeasurementRecord;
use crate::infrastructure::browser::{BrowserLauncher, BrowserSession, Viewport};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv_sink::CsvSink;
use crate::infrastructure::parsing::DashboardExtractor;

const SEPARATOR: &str = "==================================================";

/// A city that produced no record in this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCity {
    pub city: String,
    pub reason: String,
}

/// Outcome of one pass over the city list
#[derive(Debug, Default)]
pub struct RunReport {
    /// Saved records, in city declaration order
    pub records: Vec<MeasurementRecord>,
    pub skipped: Vec<SkippedCity>,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

/// Main orchestrator that coordinates the crawl run
pub struct RunOrchestrator {
    cities: Vec<CityDescriptor>,
    launcher: Arc<dyn BrowserLauncher>,
    sink: Arc<CsvSink>,
    driver: PageSessionDriver,
    viewport: Viewport,
    concurrency: usize,
}

impl RunOrchestrator {
    pub fn new(
        cities: Vec<CityDescriptor>,
        launcher: Arc<dyn BrowserLauncher>,
        sink: Arc<CsvSink>,
        extractor: DashboardExtractor,
        config: &AppConfig,
    ) -> Self {
        Self {
            cities,
            launcher,
            sink,
            driver: PageSessionDriver::new(Arc::new(extractor), &config.browser),
            viewport: config.browser.viewport,
            concurrency: config.crawl.concurrency.max(1),
        }
    }

    /// Process every city once. With a concurrency of 1 the cities run strictly
    /// one after another; otherwise at most that many are in flight.
    pub async fn run(&self) -> RunReport {
        let outcomes: Vec<_> = futures::stream::iter(&self.cities)
            .map(|city| self.process_city(city))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = RunReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(e) => report.skipped.push(SkippedCity {
                    city: e.city().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            "Run finished: {} saved, {} skipped",
            report.records.len(),
            report.skipped.len()
        );
        report
    }

    async fn process_city(&self, city: &CityDescriptor) -> Result<MeasurementRecord, CrawlError> {
        info!("{}", SEPARATOR);
        info!("Processing {}...", city.display_name);

        let result = self.crawl_city(city).await;
        let outcome = match result {
            Ok(record) => self
                .sink
                .append(&record, city.slug)
                .await
                .map(|path| {
                    info!("Data saved to: {}", path.display());
                    record
                })
                .map_err(|e| CrawlError::persist(city, &e)),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            error!("Skipping {}: {}", city.display_name, e);
        }
        outcome
    }

    /// Launch a browser, crawl the city on a fresh page and close the browser
    /// whatever the crawl outcome.
    async fn crawl_city(&self, city: &CityDescriptor) -> Result<MeasurementRecord, CrawlError> {
        let mut session = self
            .launcher
            .launch()
            .await
            .map_err(|e| CrawlError::browser(city, e))?;

        let result = self.crawl_in_session(session.as_mut(), city).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser for {}: {}", city.display_name, e);
        }
        result
    }

    async fn crawl_in_session(
        &self,
        session: &mut dyn BrowserSession,
        city: &CityDescriptor,
    ) -> Result<MeasurementRecord, CrawlError> {
        let mut page = session
            .open_page(self.viewport)
            .await
            .map_err(|e| CrawlError::browser(city, e))?;
        self.driver.crawl(page.as_mut(), city).await
    }
}
