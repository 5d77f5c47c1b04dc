mod scenarios;

use crate::config::{BrowserConfig, RetryConfig, Scenario, SuiteConfig};
use crate::{Error, Result};
use eoka::{Browser, Page};
use pagewright::Driver;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one scenario.
#[derive(Debug)]
pub struct RunResult {
    pub scenario: Scenario,
    /// Whether the scenario succeeded.
    pub success: bool,
    /// Error message of the last failed attempt.
    pub error: Option<String>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Number of retry attempts made.
    pub retries: u32,
    /// Screenshot saved after the final failed attempt.
    pub screenshot: Option<String>,
}

/// Runs suite scenarios, with an optional page for the ones that drive a browser.
pub struct Runner<D: Driver = Page> {
    browser: Option<Browser>,
    page: Option<D>,
}

impl Runner<Page> {
    /// Launch a browser with the suite's browser settings.
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1920),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(1080),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
        })
    }

    /// Launch a browser only if one of the suite's scenarios needs it.
    pub async fn for_suite(config: &SuiteConfig) -> Result<Self> {
        if config.scenarios.iter().any(Scenario::uses_browser) {
            Self::new(&config.browser).await
        } else {
            debug!("No browser scenarios, skipping launch");
            Ok(Self::without_browser())
        }
    }
}

impl<D: Driver> Runner<D> {
    /// Run browser scenarios on an already open page.
    pub fn with_driver(page: D) -> Self {
        Self {
            browser: None,
            page: Some(page),
        }
    }

    /// A runner for API-only suites.
    pub fn without_browser() -> Self {
        Self {
            browser: None,
            page: None,
        }
    }

    pub fn page(&self) -> Option<&D> {
        self.page.as_ref()
    }

    /// Run every scenario of the suite in order.
    pub async fn run(&self, config: &SuiteConfig) -> Vec<RunResult> {
        let mut results = Vec::with_capacity(config.scenarios.len());
        for &scenario in &config.scenarios {
            results.push(self.run_scenario(config, scenario).await);
        }
        results
    }

    /// Run one scenario with retry support.
    pub async fn run_scenario(&self, config: &SuiteConfig, scenario: Scenario) -> RunResult {
        info!("Running scenario: {}", scenario);
        let mut result =
            with_retries(scenario, &config.retries, || self.run_once(config, scenario)).await;
        if !result.success {
            result.screenshot = self.handle_failure(config, scenario).await;
        }
        result
    }

    async fn run_once(&self, config: &SuiteConfig, scenario: Scenario) -> Result<()> {
        match scenario {
            Scenario::TextBox => match &self.page {
                Some(page) => scenarios::text_box(page, config).await,
                None => Err(Error::Config(format!(
                    "scenario {} needs a browser",
                    scenario
                ))),
            },
            Scenario::Account => scenarios::account(config).await,
        }
    }

    async fn handle_failure(&self, config: &SuiteConfig, scenario: Scenario) -> Option<String> {
        if !scenario.uses_browser() {
            return None;
        }
        let page = self.page.as_ref()?;
        let template = config.screenshot_template()?;
        let path = screenshot_path(template, scenario, &chrono::Local::now());
        info!("Saving failure screenshot to: {}", path);

        let data = match page.screenshot().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to take screenshot: {}", e);
                return None;
            }
        };
        if let Some(parent) = Path::new(&path).parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create {}: {}", parent.display(), e);
                return None;
            }
        }
        match std::fs::write(&path, data) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Failed to save screenshot: {}", e);
                None
            }
        }
    }

    /// Close the browser, if this runner launched one.
    pub async fn close(self) -> Result<()> {
        if let Some(browser) = self.browser {
            browser.close().await?;
        }
        Ok(())
    }
}

/// Call `attempt` up to `retries.attempts` times, sleeping `retries.delay_ms` between
/// calls. The result never carries a screenshot.
async fn with_retries<F, Fut>(
    scenario: Scenario,
    retries: &RetryConfig,
    mut attempt: F,
) -> RunResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let start = Instant::now();
    let max_attempts = retries.attempts.max(1);

    let mut last_error = None;
    let mut retried = 0;

    for n in 1..=max_attempts {
        if n > 1 {
            retried += 1;
            info!("Retry attempt {}/{}", n, max_attempts);
            if retries.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(retries.delay_ms)).await;
            }
        }

        match attempt().await {
            Ok(()) => {
                return RunResult {
                    scenario,
                    success: true,
                    error: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                    retries: retried,
                    screenshot: None,
                };
            }
            Err(e) => {
                warn!("{} attempt {} failed: {}", scenario, n, e);
                last_error = Some(e.to_string());
            }
        }
    }

    RunResult {
        scenario,
        success: false,
        error: last_error,
        duration_ms: start.elapsed().as_millis() as u64,
        retries: retried,
        screenshot: None,
    }
}

/// Fill `{scenario}` and `{timestamp}` in a screenshot template.
fn screenshot_path<Tz: chrono::TimeZone>(
    template: &str,
    scenario: Scenario,
    now: &chrono::DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    template
        .replace("{scenario}", scenario.name())
        .replace("{timestamp}", &now.format("%Y%m%d-%H%M%S").to_string())
}
