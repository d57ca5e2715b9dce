//! Headless browser capability
//!
//! The crawler needs three things from a browser: launch it, open a page with a
//! fixed viewport, and on that page navigate, wait for the network to settle and
//! read the rendered HTML. Those are the traits below; [`ChromiumLauncher`]
//! implements them over Chromium via `chromiumoxide`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, trace, warn};

use super::config::{BrowserSettings, defaults};

const DOCUMENT_COMPLETE_SCRIPT: &str = "document.readyState === 'complete'";

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open page: {0}")]
    PageCreation(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {}s while {stage}", timeout.as_secs_f64())]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },

    #[error("Failed to read page: {0}")]
    Content(String),

    #[error("Failed to close browser: {0}")]
    Close(String),
}

impl BrowserError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Page viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: defaults::VIEWPORT_WIDTH,
            height: defaults::VIEWPORT_HEIGHT,
        }
    }
}

/// Starts browser sessions. One session is used per city.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>>;
}

/// A running browser.
#[async_trait]
pub trait BrowserSession: Send {
    async fn open_page(&mut self, viewport: Viewport) -> BrowserResult<Box<dyn DashboardPage>>;

    /// Shut the browser down. Calling it twice is harmless.
    async fn close(&mut self) -> BrowserResult<()>;
}

/// A single tab.
#[async_trait]
pub trait DashboardPage: Send {
    async fn goto(&mut self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Resolve once no new network resource has appeared for `idle_window`.
    async fn wait_for_network_idle(
        &mut self,
        timeout: Duration,
        idle_window: Duration,
    ) -> BrowserResult<()>;

    /// Fully rendered HTML.
    async fn content(&mut self) -> BrowserResult<String>;
}

/// Launches Chromium with the configured settings
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub const fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> BrowserResult<BrowserConfig> {
        let viewport = self.settings.viewport;
        let mut builder = BrowserConfig::builder()
            .viewport(chromiumoxide::handler::viewport::Viewport {
                width: viewport.width,
                height: viewport.height,
                ..Default::default()
            })
            .window_size(viewport.width, viewport.height)
            .request_timeout(self.settings.navigation_timeout());

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in &self.settings.extra_args {
            builder = builder.arg(arg);
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Chromium handler event error: {}", e);
                }
            }
        });

        debug!("Chromium launched (headless: {})", self.settings.headless);
        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
            closed: false,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn open_page(&mut self, viewport: Viewport) -> BrowserResult<Box<dyn DashboardPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreation(e.to_string()))?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        ))
        .await
        .map_err(|e| BrowserError::PageCreation(e.to_string()))?;

        let (network, tracker) = track_network(&page).await?;
        Ok(Box::new(ChromiumPage {
            page,
            network,
            tracker,
        }))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::Close(e.to_string()));
        if let Err(e) = self.browser.wait().await {
            warn!("Chromium process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        result.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// Requests a page has started but not yet finished, fed from CDP network events.
#[derive(Debug)]
struct NetworkActivity {
    in_flight: HashSet<String>,
    last_change: Instant,
}

impl NetworkActivity {
    fn new(now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            last_change: now,
        }
    }

    fn request_started(&mut self, id: String, now: Instant) {
        self.in_flight.insert(id);
        self.last_change = now;
    }

    fn request_ended(&mut self, id: &str, now: Instant) {
        if self.in_flight.remove(id) {
            self.last_change = now;
        }
    }

    /// How long no request has been in flight, `None` while one still is.
    fn quiet_for(&self, now: Instant) -> Option<Duration> {
        self.in_flight
            .is_empty()
            .then(|| now.saturating_duration_since(self.last_change))
    }
}

/// Subscribe to the page's network events before any navigation happens.
async fn track_network(
    page: &Page,
) -> BrowserResult<(Arc<Mutex<NetworkActivity>>, JoinHandle<()>)> {
    let mut sent = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(|e| BrowserError::PageCreation(e.to_string()))?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(|e| BrowserError::PageCreation(e.to_string()))?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(|e| BrowserError::PageCreation(e.to_string()))?;

    let network = Arc::new(Mutex::new(NetworkActivity::new(Instant::now())));
    let shared = Arc::clone(&network);
    let tracker = tokio::spawn(async move {
        loop {
            let (id, started) = tokio::select! {
                Some(event) = sent.next() => (event.request_id.inner().clone(), true),
                Some(event) = finished.next() => (event.request_id.inner().clone(), false),
                Some(event) = failed.next() => (event.request_id.inner().clone(), false),
                else => break,
            };
            let Ok(mut activity) = shared.lock() else {
                break;
            };
            if started {
                activity.request_started(id, Instant::now());
            } else {
                activity.request_ended(&id, Instant::now());
            }
        }
    });

    Ok((network, tracker))
}

struct ChromiumPage {
    page: Page,
    network: Arc<Mutex<NetworkActivity>>,
    tracker: JoinHandle<()>,
}

impl ChromiumPage {
    async fn document_complete(&self) -> BrowserResult<bool> {
        self.page
            .evaluate(DOCUMENT_COMPLETE_SCRIPT)
            .await
            .map_err(|e| BrowserError::Content(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Content(e.to_string()))
    }

    fn quiet_for(&self) -> Option<Duration> {
        self.network
            .lock()
            .ok()
            .and_then(|activity| activity.quiet_for(Instant::now()))
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.tracker.abort();
    }
}

#[async_trait]
impl DashboardPage for ChromiumPage {
    async fn goto(&mut self, url: &str, limit: Duration) -> BrowserResult<()> {
        timeout(limit, self.page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout {
                stage: "navigating",
                timeout: limit,
            })?
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_network_idle(
        &mut self,
        limit: Duration,
        idle_window: Duration,
    ) -> BrowserResult<()> {
        let poll = async {
            loop {
                if self.document_complete().await? {
                    if let Some(quiet) = self.quiet_for().filter(|quiet| *quiet >= idle_window) {
                        trace!("Network idle for {:?}", quiet);
                        return Ok(());
                    }
                }
                sleep(IDLE_POLL_INTERVAL).await;
            }
        };

        timeout(limit, poll).await.map_err(|_| BrowserError::Timeout {
            stage: "waiting for network idle",
            timeout: limit,
        })?
    }

    async fn content(&mut self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Content(e.to_string()))
    }
}
