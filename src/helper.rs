//! The interaction helper: one choke point for every element interaction.
//!
//! Each public operation resolves its locator once, runs the locate-and-validate
//! sequence on the resolved [`Element`], performs its action on that same element and
//! reports through the injected [`EventSink`]. Failures are wrapped in
//! [`Error::Operation`] with a fixed prefix and the original error kept as the source.

use crate::config::HelperConfig;
use crate::driver::{Driver, ElementState};
use crate::locator::{Element, Locator, Scope};
use crate::sink::{EventSink, TracingSink};
use crate::{Error, Result};
use eoka::Page;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Source location attached to alert events.
const SOURCE: &str = file!();

const REDACTED: &str = "<redacted>";

/// Whether a typed value may appear in logs and error messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sensitivity {
    #[default]
    Plain,
    /// Passwords, tokens: the value is never logged.
    Sensitive,
}

impl From<bool> for Sensitivity {
    fn from(sensitive: bool) -> Self {
        if sensitive {
            Self::Sensitive
        } else {
            Self::Plain
        }
    }
}

/// Optional scheme, dotted host with an alphabetic TLD, optional port, optional path.
const URL_PATTERN: &str = r"^(https?://)?(([a-zA-Z0-9-]+)\.)+[a-zA-Z]{2,}(:[0-9]{1,5})?(/\S*)?$";

/// Check `url` against the accepted URL shape.
///
/// ```
/// use pagewright::is_valid_url;
///
/// assert!(is_valid_url("https://example.com:8080/path"));
/// assert!(is_valid_url("demoqa.com/text-box"));
/// assert!(!is_valid_url("not a url"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
        .is_match(url)
}

/// Equal URLs, tolerating one trailing slash added by the browser.
fn urls_match(expected: &str, actual: &str) -> bool {
    fn strip(s: &str) -> &str {
        s.strip_suffix('/').unwrap_or(s)
    }
    expected == actual || strip(expected) == strip(actual)
}

/// Time budget for one wait.
struct Deadline {
    end: Instant,
    poll: Duration,
}

impl Deadline {
    fn expired(&self) -> bool {
        Instant::now() >= self.end
    }

    async fn tick(&self) {
        let remaining = self.end.saturating_duration_since(Instant::now());
        tokio::time::sleep(self.poll.min(remaining)).await;
    }
}

/// Locates, validates and acts on elements of one page.
///
/// Bound to a [`Scope`]: the page by default, or a frame via [`within`](Self::within).
/// Cloning is cheap; clones share the driver and the sink.
pub struct InteractionHelper<'p, D: Driver = Page> {
    driver: &'p D,
    config: HelperConfig,
    scope: Scope,
    sink: Arc<dyn EventSink>,
}

impl<'p, D: Driver> Clone for InteractionHelper<'p, D> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver,
            config: self.config,
            scope: self.scope.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<'p, D: Driver> fmt::Debug for InteractionHelper<'p, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHelper")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl<'p, D: Driver> InteractionHelper<'p, D> {
    /// Helper for the page scope that logs through `tracing`.
    pub fn new(driver: &'p D, config: HelperConfig) -> Self {
        Self::with_sink(driver, config, Arc::new(TracingSink))
    }

    pub fn with_sink(driver: &'p D, config: HelperConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            driver,
            config,
            scope: Scope::Page,
            sink,
        }
    }

    /// A helper that resolves raw selectors in `scope` instead.
    pub fn within(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    pub fn driver(&self) -> &'p D {
        self.driver
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Bind a locator to this helper's scope without touching the DOM.
    pub fn resolve(&self, locator: impl Into<Locator>) -> Element {
        locator.into().resolve(&self.scope)
    }

    /// Resolve the locator and wait until it names exactly one interactable element.
    ///
    /// Waits up to the configured timeout for a single match, focuses the element when it
    /// is not focused yet, then waits, in order, for it to be visible, not hidden,
    /// enabled and not disabled.
    pub async fn locate_element(&self, locator: impl Into<Locator>) -> Result<Element> {
        let element = self.resolve(locator);
        debug!("locate: {}", element);
        let result = self.validate(&element).await;
        self.wrap("locate_element", "Element not found", result)?;
        self.sink.inform("Successfully located element");
        Ok(element)
    }

    pub async fn is_element_focused(&self, element: &Element) -> Result<bool> {
        Ok(self.driver.state(element).await?.focused)
    }

    async fn validate(&self, element: &Element) -> Result<()> {
        self.wait_for_single(element).await?;

        match self.is_element_focused(element).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = self.driver.focus(element).await {
                    debug!("focus on {} failed: {}", element, e);
                }
            }
            Err(e) => debug!("focus check on {} failed: {}", element, e),
        }

        // Usually everything already holds; skip the individual waits
        if self
            .driver
            .state(element)
            .await
            .is_ok_and(|state| state.is_interactable())
        {
            return Ok(());
        }

        self.wait_for_state(element, |s| s.visible, |selector| Error::NotVisible { selector })
            .await?;
        self.wait_for_state(element, |s| !s.hidden, |selector| Error::Hidden { selector })
            .await?;
        self.wait_for_state(element, |s| s.enabled, |selector| Error::NotEnabled { selector })
            .await?;
        self.wait_for_state(element, |s| !s.disabled, |selector| Error::Disabled { selector })
            .await
    }

    async fn wait_for_single(&self, element: &Element) -> Result<()> {
        let deadline = self.deadline();
        loop {
            let count = self.driver.count(element).await?;
            if count == 1 {
                return Ok(());
            }
            if deadline.expired() {
                return Err(Error::NotFound {
                    selector: element.to_string(),
                    count,
                });
            }
            deadline.tick().await;
        }
    }

    async fn wait_for_state(
        &self,
        element: &Element,
        holds: fn(&ElementState) -> bool,
        failure: fn(String) -> Error,
    ) -> Result<()> {
        let deadline = self.deadline();
        loop {
            let stale = match self.driver.state(element).await {
                Ok(state) if holds(&state) => return Ok(()),
                Ok(_) => None,
                Err(e @ Error::NotFound { .. }) => Some(e),
                Err(e) => return Err(e),
            };
            if deadline.expired() {
                return Err(stale.unwrap_or_else(|| failure(element.to_string())));
            }
            deadline.tick().await;
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Clear the element and type `text` into it, then confirm the value landed.
    ///
    /// In the page scope the existing content is selected with `Control+A` and
    /// `Meta+A` first; frames have no keyboard, so they are cleared by filling an empty
    /// string. The write is confirmed by the input value or, failing that, the
    /// rendered text.
    pub async fn send_keys(
        &self,
        locator: impl Into<Locator>,
        text: &str,
        sensitivity: impl Into<Sensitivity>,
    ) -> Result<()> {
        let sensitivity = sensitivity.into();
        let result = self.type_text(locator.into(), text, sensitivity).await;
        self.wrap("send_keys", "Keys were not sent", result)?;
        match sensitivity {
            Sensitivity::Plain => self
                .sink
                .inform(&format!("Successfully sent keys: {}", text)),
            Sensitivity::Sensitive => self
                .sink
                .inform("Successfully sent keys to a sensitive field"),
        }
        Ok(())
    }

    async fn type_text(&self, locator: Locator, text: &str, sensitivity: Sensitivity) -> Result<()> {
        let element = self.locate_element(locator).await?;
        if element.scope().has_keyboard() {
            self.driver.keyboard_press("Control+A").await?;
            self.driver.keyboard_press("Meta+A").await?;
        } else {
            self.driver.fill(&element, "").await?;
        }
        self.driver.fill(&element, text).await?;

        if let Ok(Some(value)) = self.driver.input_value(&element).await {
            if value == text {
                return Ok(());
            }
        }
        if let Ok(Some(rendered)) = self.driver.text_content(&element).await {
            if rendered == text {
                return Ok(());
            }
        }
        let shown = match sensitivity {
            Sensitivity::Plain => text.to_string(),
            Sensitivity::Sensitive => REDACTED.to_string(),
        };
        Err(Error::InputVerification { shown })
    }

    /// Press a key or chord (`Enter`, `Control+A`) on the element.
    pub async fn send_keyboard_keys(&self, keys: &str, locator: impl Into<Locator>) -> Result<()> {
        let result = async {
            let element = self.locate_element(locator).await?;
            self.driver.press(&element, keys).await
        }
        .await;
        self.wrap(
            "send_keyboard_keys",
            format!("The keys '{}' were not sent to the element", keys),
            result,
        )
    }

    /// Click the element, even when something is momentarily drawn over it.
    pub async fn click_element(&self, locator: impl Into<Locator>) -> Result<()> {
        let result = async {
            let element = self.locate_element(locator).await?;
            self.driver.click(&element).await
        }
        .await;
        self.wrap("click_element", "Element could not be clicked", result)?;
        self.sink.inform("Successfully clicked element");
        Ok(())
    }

    /// Read the element's text content.
    ///
    /// Empty text is an error. When `expected` is given and non-empty, the text must be
    /// equal to it.
    pub async fn get_element_text(
        &self,
        locator: impl Into<Locator>,
        expected: Option<&str>,
    ) -> Result<String> {
        let result = self.read_text(locator.into(), expected).await;
        let text = self.wrap(
            "get_element_text",
            "Could not retrieve text from element",
            result,
        )?;
        self.sink
            .inform(&format!("Text retrieved from element: {}", text));
        Ok(text)
    }

    async fn read_text(&self, locator: Locator, expected: Option<&str>) -> Result<String> {
        let element = self.locate_element(locator).await?;
        let text = self
            .driver
            .text_content(&element)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::EmptyText {
                selector: element.to_string(),
            })?;
        if let Some(expected) = expected.filter(|e| !e.is_empty()) {
            if text != expected {
                return Err(Error::AssertionMismatch {
                    expected: expected.to_string(),
                    actual: text,
                });
            }
        }
        Ok(text)
    }

    /// Navigate the page to `url` and wait for the page URL to equal it.
    ///
    /// Malformed URLs are rejected before the browser is touched.
    pub async fn navigate_to(&self, url: &str) -> Result<()> {
        let result = async {
            if !is_valid_url(url) {
                return Err(Error::InvalidUrl(url.to_string()));
            }
            debug!("goto: {}", url);
            self.driver.goto(url).await?;
            self.wait_for_url(url).await
        }
        .await;
        self.wrap("navigate_to", format!("Error navigating to {}", url), result)?;
        self.sink
            .inform(&format!("Successfully navigated to {}", url));
        Ok(())
    }

    async fn wait_for_url(&self, expected: &str) -> Result<()> {
        let deadline = self.deadline();
        loop {
            let actual = self.driver.url().await?;
            if urls_match(expected, &actual) {
                return Ok(());
            }
            if deadline.expired() {
                return Err(Error::UrlMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
            deadline.tick().await;
        }
    }

    /// Bring the element into view; a no-op when it is already fully visible.
    pub async fn scroll_to_element(&self, locator: impl Into<Locator>) -> Result<()> {
        let result = async {
            let element = self.locate_element(locator).await?;
            let scrolled = self.driver.scroll_into_view_if_needed(&element).await?;
            debug!("scroll_to {}: scrolled={}", element, scrolled);
            Ok::<(), Error>(())
        }
        .await;
        self.wrap("scroll_to_element", "Could not scroll to element", result)?;
        self.sink.inform("Successfully scrolled to element");
        Ok(())
    }

    /// Suspend this task for `ms` milliseconds. Prefer a condition-based wait where one
    /// exists.
    pub async fn delay(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn deadline(&self) -> Deadline {
        Deadline {
            end: Instant::now() + self.config.timeout(),
            poll: self.config.poll_interval(),
        }
    }

    /// Alert and wrap a failed operation result.
    fn wrap<T>(
        &self,
        operation: &'static str,
        context: impl Into<String>,
        result: Result<T>,
    ) -> Result<T> {
        result.map_err(|source| {
            self.sink.alert(&format!("{} @ {}", operation, SOURCE));
            Error::Operation {
                operation,
                context: context.into(),
                source: Box::new(source),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        for url in [
            "https://example.com:8080/path",
            "http://demoqa.com",
            "https://demoqa.com/text-box",
            "example.com",
            "sub.domain.example.org/a/b?c=d",
            "https://my-site.co.uk:443/",
        ] {
            assert!(is_valid_url(url), "{} should be valid", url);
        }
    }

    #[test]
    fn test_invalid_urls() {
        for url in [
            "not a url",
            "",
            "localhost:3000",
            "ftp://example.com",
            "https://example.c",
            "https://example.com:123456",
            "https://example.com/has space",
            "data:text/html,<p>hi</p>",
        ] {
            assert!(!is_valid_url(url), "{} should be invalid", url);
        }
    }

    #[test]
    fn test_urls_match_trailing_slash() {
        assert!(urls_match("https://example.com", "https://example.com/"));
        assert!(urls_match("https://example.com/a/", "https://example.com/a"));
        assert!(!urls_match("https://example.com/a", "https://example.com/b"));
        assert!(!urls_match("https://example.com", "https://example.com//"));
    }

    #[test]
    fn test_sensitivity_from_bool() {
        assert_eq!(Sensitivity::from(true), Sensitivity::Sensitive);
        assert_eq!(Sensitivity::from(false), Sensitivity::Plain);
    }
}
