#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use aqi_crawler_lib::RunOrchestrator;
use aqi_crawler_lib::domain::{default_cities, ict_now};
use aqi_crawler_lib::infrastructure::config::defaults;
use aqi_crawler_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use aqi_crawler_lib::infrastructure::parsing::DashboardExtractor;
use aqi_crawler_lib::infrastructure::{AppConfig, ChromiumLauncher, CsvSink};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os(defaults::CONFIG_PATH_ENV).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    if let Err(e) = run(config).await {
        error!("Error occurred: {:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Logging is configured from this file, so a load failure goes to stderr.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path)
        .context("Failed to load configuration")
        .inspect_err(|e| eprintln!("Error occurred: {e:#}"))
}

async fn run(config: AppConfig) -> Result<()> {
    let cities = default_cities();
    info!("Starting AQI data crawler...");
    info!(
        "Current time in Vietnam: {}",
        ict_now().format("%Y-%m-%d %H:%M:%S %:z")
    );
    info!("Cities to crawl: {}", cities.len());

    let orchestrator = RunOrchestrator::new(
        cities,
        Arc::new(ChromiumLauncher::new(config.browser.clone())),
        Arc::new(CsvSink::new(&config.output.result_dir)),
        DashboardExtractor::new(config.selectors.clone()),
        &config,
    );
    let report = orchestrator.run().await;

    println!("\nCrawled data:");
    println!(
        "{}",
        report.to_json_pretty().context("Failed to serialize crawled data")?
    );
    Ok(())
}
