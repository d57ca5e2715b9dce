//! Test utilities
//!
//! Dashboard HTML fixtures, a [`PageNode`] wrapper that injects query failures,
//! and a scripted in-memory browser so crawl flows run without Chromium.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scraper::ElementRef;

use crate::infrastructure::browser::{
    BrowserError, BrowserLauncher, BrowserResult, BrowserSession, DashboardPage, Viewport,
};
use crate::infrastructure::parsing::{PageNode, ParsingError, ParsingResult};

pub mod fixtures {
    /// Complete dashboard: every field present, SO2 not shown, one unknown pollutant.
    pub const DASHBOARD: &str = r#"<!DOCTYPE html>
<html>
<head><title>Air Quality Dashboard</title></head>
<body>
  <section class="aqi-card">
    <span class="font-extrabold" title="87">87</span>
    <span class="condition-text"> Haze </span>
    <span class="text-[2.5rem]">31</span>
    <span class="text-[1.7rem]">°C</span>
  </section>
  <section class="weather">
    <div class="component">
      <img alt="Humidity" src="/icons/humidity.svg">
      <span>Humidity</span>
      <span><span>78</span></span>
    </div>
    <div class="component">
      <img alt="Wind Speed" src="/icons/wind.svg">
      <span>Wind Speed</span>
      <span><span>25</span><span>mph</span></span>
    </div>
    <div class="component">
      <img alt="UV Index" src="/icons/uv.svg">
      <span>UV Index</span>
      <span><span>3</span></span>
    </div>
  </section>
  <section class="pollutants">
    <div class="major-pollutant">
      <p class="sensor-name">PM2.5</p>
      <span class="font-bold">55</span>
      <p class="sensor-unit">µg/m³</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">PM10</p>
      <span class="font-bold">80</span>
      <p class="sensor-unit">µg/m³</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">NO2</p>
      <span class="font-bold">12.5</span>
      <p class="sensor-unit">ppb</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">O3</p>
      <span class="font-bold">31</span>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">CO</p>
      <span class="font-bold">410</span>
      <p class="sensor-unit">ppb</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">Radon</p>
      <span class="font-bold">2</span>
      <p class="sensor-unit">pCi/L</p>
    </div>
  </section>
</body>
</html>"#;

    /// Pollutant table whose PM2.5 entry is marked `data-fault`; see [`super::FaultyNode`].
    pub const DASHBOARD_WITH_FAULTY_POLLUTANT: &str = r#"<!DOCTYPE html>
<html>
<body>
  <span class="font-extrabold" title="152">152</span>
  <section class="pollutants">
    <div class="major-pollutant" data-fault="true">
      <p class="sensor-name">PM2.5</p>
      <span class="font-bold">60</span>
      <p class="sensor-unit">µg/m³</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">PM10</p>
      <span class="font-bold">80</span>
      <p class="sensor-unit">µg/m³</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">O3</p>
      <span class="font-bold">31</span>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">NO2</p>
      <span class="font-bold">12.5</span>
      <p class="sensor-unit">ppb</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">SO2</p>
      <span class="font-bold">4</span>
      <p class="sensor-unit">ppb</p>
    </div>
    <div class="major-pollutant">
      <p class="sensor-name">CO</p>
      <span class="font-bold">410</span>
      <p class="sensor-unit">ppb</p>
    </div>
  </section>
</body>
</html>"#;

    /// A page that rendered but carries none of the dashboard markup.
    pub const BLANK_PAGE: &str = "<html><body><p>Service temporarily unavailable</p></body></html>";
}

/// [`PageNode`] over `scraper` that fails every query issued on an element
/// carrying a `data-fault` attribute.
#[derive(Debug, Clone, Copy)]
pub struct FaultyNode<'a> {
    inner: ElementRef<'a>,
}

impl<'a> FaultyNode<'a> {
    pub const fn new(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }

    fn check(&self, selector: &str) -> ParsingResult<()> {
        if self.inner.value().attr("data-fault").is_some() {
            Err(ParsingError::query_failed(selector, "injected fault"))
        } else {
            Ok(())
        }
    }
}

impl PageNode for FaultyNode<'_> {
    fn find_one(&self, selector: &str) -> ParsingResult<Option<Self>> {
        self.check(selector)?;
        Ok(PageNode::find_one(&self.inner, selector)?.map(Self::new))
    }

    fn find_all(&self, selector: &str) -> ParsingResult<Vec<Self>> {
        self.check(selector)?;
        Ok(PageNode::find_all(&self.inner, selector)?
            .into_iter()
            .map(Self::new)
            .collect())
    }

    fn text(&self) -> String {
        PageNode::text(&self.inner)
    }

    fn attr(&self, name: &str) -> Option<String> {
        PageNode::attr(&self.inner, name)
    }
}

/// What the scripted browser does for one URL.
#[derive(Debug, Clone)]
pub enum PageScript {
    /// Navigation and idle wait succeed; the page renders this HTML.
    Html(String),
    /// Navigation never completes within the timeout.
    NavigationTimeout,
    /// Navigation succeeds but the network never settles.
    IdleTimeout,
}

/// Counters shared between a [`FakeLauncher`] and its sessions.
#[derive(Debug, Default)]
pub struct BrowserStats {
    pub launches: AtomicUsize,
    pub pages: AtomicUsize,
    pub closes: AtomicUsize,
}

impl BrowserStats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Scripted [`BrowserLauncher`]. URLs without a script fail navigation.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    scripts: HashMap<String, PageScript>,
    fail_launch: bool,
    pub stats: Arc<BrowserStats>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: &str, script: PageScript) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    #[must_use]
    pub const fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(BrowserError::Launch("no browser binary".to_string()));
        }
        Ok(Box::new(FakeSession {
            scripts: self.scripts.clone(),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeSession {
    scripts: HashMap<String, PageScript>,
    stats: Arc<BrowserStats>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn open_page(&mut self, _viewport: Viewport) -> BrowserResult<Box<dyn DashboardPage>> {
        self.stats.pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            scripts: self.scripts.clone(),
            current: None,
        }))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakePage {
    scripts: HashMap<String, PageScript>,
    current: Option<PageScript>,
}

#[async_trait]
impl DashboardPage for FakePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> BrowserResult<()> {
        match self.scripts.get(url) {
            Some(PageScript::NavigationTimeout) => Err(BrowserError::Timeout {
                stage: "navigating",
                timeout,
            }),
            Some(script) => {
                self.current = Some(script.clone());
                Ok(())
            }
            None => Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn wait_for_network_idle(
        &mut self,
        timeout: Duration,
        _idle_window: Duration,
    ) -> BrowserResult<()> {
        match self.current {
            Some(PageScript::IdleTimeout) => Err(BrowserError::Timeout {
                stage: "waiting for network idle",
                timeout,
            }),
            _ => Ok(()),
        }
    }

    async fn content(&mut self) -> BrowserResult<String> {
        match &self.current {
            Some(PageScript::Html(html)) => Ok(html.clone()),
            _ => Ok(String::new()),
        }
    }
}
