//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console output on stdout
//! - Optional file output through a non-blocking writer
//! - Structured JSON logging for the file (optional)
//! - ICT (Indochina Time, UTC+7) timestamps

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::domain::ict_now;

pub use crate::infrastructure::config::LoggingConfig;

/// Dependencies that are noisy below TRACE.
const QUIET_TARGETS: [(&str, &str); 5] = [
    ("chromiumoxide", "warn"),
    ("chromiumoxide::conn", "error"),
    ("tungstenite", "warn"),
    ("hyper", "warn"),
    ("tokio", "info"),
];

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Time formatter for ICT (Indochina Time, UTC+7)
struct IctTimeFormatter;

impl FormatTime for IctTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", ict_now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Resolve the log directory; relative paths are taken from the working directory.
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    if config.log_dir.is_absolute() {
        config.log_dir.clone()
    } else {
        std::env::current_dir()
            .unwrap_or_default()
            .join(&config.log_dir)
    }
}

/// Filter from `RUST_LOG` when set, otherwise from the configured level with
/// the noisy dependencies turned down unless TRACE was requested.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))?;
    if !level.to_lowercase().contains("trace") {
        for (target, target_level) in QUIET_TARGETS {
            filter = filter.add_directive(format!("{target}={target_level}").parse()?);
        }
    }
    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// `RUST_LOG` replaces the configured filter entirely:
/// ```bash
/// # Show Chromium protocol traffic
/// RUST_LOG="debug,chromiumoxide=debug" aqi-crawler
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(&config.level)?;

    let file_layer = if config.file_output {
        let log_dir = get_log_directory(config);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let (file_writer, file_guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let layer = if config.json_format {
            fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(IctTimeFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(IctTimeFormatter)
                .with_target(false)
                .with_ansi(false)
                .boxed()
        };
        Some(layer)
    } else {
        None
    };

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(IctTimeFormatter)
            .with_target(false)
    });

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!(
            "Log file: {:?} (JSON format: {})",
            get_log_directory(config).join(&config.file_name),
            config.json_format
        );
    }
    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
}
