//! # pagewright
//!
//! Element interaction layer for browser tests. Every click, keystroke and read goes
//! through one [`InteractionHelper`], which resolves the locator once, waits for the element
//! to be interactable, performs the action and reports failures in a single shape.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagewright::{Browser, HelperConfig, InteractionHelper, Sensitivity};
//!
//! # #[tokio::main]
//! # async fn main() -> pagewright::Result<()> {
//! let browser = Browser::launch().await?;
//! let page = browser.new_page("about:blank").await?;
//!
//! let helper = InteractionHelper::new(&page, HelperConfig::default());
//! helper.navigate_to("https://demoqa.com/text-box").await?;
//! helper.send_keys("//input[@id='userName']", "Jane Doe", Sensitivity::Plain).await?;
//! helper.click_element("//button[@id='submit']").await?;
//! let name = helper.get_element_text("//p[@id='name']", None).await?;
//! println!("{name}");
//!
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod helper;
pub mod locator;
pub mod sink;
pub mod testing;

pub use config::HelperConfig;
pub use driver::{Driver, ElementState};
pub use helper::{is_valid_url, InteractionHelper, Sensitivity};
pub use locator::{Element, Locator, Scope, Selector};
pub use sink::{EventSink, LogEvent, LogLevel, RecordingSink, TracingSink};

// Re-export eoka types that suites need
pub use eoka::{Browser, Page, StealthConfig};

/// Result type for pagewright operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the interaction layer.
///
/// Failures inside an operation are reported as one of the condition variants and then
/// wrapped in [`Error::Operation`] at the public boundary, which keeps the original as its
/// [`source`](std::error::Error::source).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected exactly one element matching {selector}, found {count}")]
    NotFound { selector: String, count: usize },

    #[error("element {selector} is not visible")]
    NotVisible { selector: String },

    #[error("element {selector} is hidden")]
    Hidden { selector: String },

    #[error("element {selector} is not enabled")]
    NotEnabled { selector: String },

    #[error("element {selector} is disabled")]
    Disabled { selector: String },

    #[error("failed to enter the text: \"{shown}\". Neither the input value nor the element text confirmed the input")]
    InputVerification { shown: String },

    #[error("text does not exist in element {selector}")]
    EmptyText { selector: String },

    #[error("expected {expected:?}, received {actual:?}")]
    AssertionMismatch { expected: String, actual: String },

    #[error("not a URL address: {0}")]
    InvalidUrl(String),

    #[error("page URL is {actual}, expected {expected}")]
    UrlMismatch { expected: String, actual: String },

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("script error: {0}")]
    Script(String),

    #[error("{context}. Received error: {source}")]
    Operation {
        operation: &'static str,
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Innermost error of a chain of [`Error::Operation`] wrappers.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Operation { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Name of the outermost operation that failed, if this error was wrapped.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// True for every "element could not be used" condition.
    ///
    /// Missing, ambiguous, invisible, hidden, not enabled and disabled elements all
    /// count, for callers that only care whether the element was usable.
    pub fn is_element_not_found(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::NotFound { .. }
                | Error::NotVisible { .. }
                | Error::Hidden { .. }
                | Error::NotEnabled { .. }
                | Error::Disabled { .. }
        )
    }
}
