//! Configuration infrastructure
//!
//! Contains configuration loading for the crawler. Every setting has a built-in
//! default; an optional file and `AQI_CRAWLER__*` environment variables override
//! them. The city list is compiled in and deliberately not part of this file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::browser::Viewport;
use super::parsing::DashboardSelectors;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browser: BrowserSettings,
    pub output: OutputSettings,
    pub crawl: CrawlSettings,
    pub logging: LoggingConfig,
    pub selectors: DashboardSelectors,
}

/// Headless browser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run Chromium without a window
    pub headless: bool,

    /// Page viewport
    pub viewport: Viewport,

    /// Upper bound for navigation and for the network idle wait, in seconds
    pub navigation_timeout_secs: u64,

    /// How long the network must stay quiet to count as idle, in milliseconds
    pub network_idle_ms: u64,

    /// Explicit Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,

    /// Extra command line switches passed to Chromium
    pub extra_args: Vec<String>,
}

impl BrowserSettings {
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub const fn network_idle_window(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root directory of the per-city CSV tree
    pub result_dir: PathBuf,
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Cities processed at once, each in its own browser; 1 keeps the run strictly sequential
    pub concurrency: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs (file output only)
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for the log file
    pub log_dir: PathBuf,

    /// Log file name inside `log_dir`
    pub file_name: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            navigation_timeout_secs: defaults::NAVIGATION_TIMEOUT_SECONDS,
            network_idle_ms: defaults::NETWORK_IDLE_MS,
            chrome_executable: None,
            extra_args: defaults::CHROMIUM_ARGS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            result_dir: PathBuf::from(defaults::RESULT_DIR),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: defaults::CONCURRENCY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the optional file, then environment.
    ///
    /// An explicitly given `path` must exist; the default path may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(p) => (p.to_string_lossy().into_owned(), true),
            None => (defaults::CONFIG_PATH.to_string(), false),
        };

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(required))
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("browser.extra_args")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        info!("Configuration loaded (file: {}, required: {})", file, required);
        Ok(config)
    }

    /// Reject settings the crawler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                message: "browser.navigation_timeout_secs must be greater than 0".to_string(),
            });
        }
        if self.browser.viewport.width == 0 || self.browser.viewport.height == 0 {
            return Err(ConfigError::Validation {
                message: format!(
                    "browser.viewport must be non-empty, got {}x{}",
                    self.browser.viewport.width, self.browser.viewport.height
                ),
            });
        }
        if self.crawl.concurrency == 0 {
            return Err(ConfigError::Validation {
                message: "crawl.concurrency must be at least 1".to_string(),
            });
        }
        if let Some((name, selector)) = self
            .selectors
            .entries()
            .into_iter()
            .find(|(_, selector)| scraper::Selector::parse(selector).is_err())
        {
            return Err(ConfigError::Validation {
                message: format!("selectors.{name} is not a valid CSS selector: {selector}"),
            });
        }
        Ok(())
    }
}

/// Default values
pub mod defaults {
    /// Config file looked up when no path is given (extension resolved by the loader)
    pub const CONFIG_PATH: &str = "config/aqi_crawler";

    /// Environment variable prefix, e.g. `AQI_CRAWLER__CRAWL__CONCURRENCY=2`
    pub const ENV_PREFIX: &str = "AQI_CRAWLER";

    /// Environment variable naming an explicit config file
    pub const CONFIG_PATH_ENV: &str = "AQI_CRAWLER_CONFIG";

    /// Navigation and network idle upper bound
    pub const NAVIGATION_TIMEOUT_SECONDS: u64 = 30;

    /// Quiet period that counts as network idle
    pub const NETWORK_IDLE_MS: u64 = 500;

    pub const VIEWPORT_WIDTH: u32 = 1280;
    pub const VIEWPORT_HEIGHT: u32 = 720;

    pub const RESULT_DIR: &str = "result";

    /// Sequential by default
    pub const CONCURRENCY: usize = 1;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_DIR: &str = "logs";
    pub const LOG_FILE_NAME: &str = "aqi_crawler.log";

    pub const CHROMIUM_ARGS: [&str; 3] = ["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"];
}
