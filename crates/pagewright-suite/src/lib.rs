//! # pagewright-suite
//!
//! End-to-end suite for the demoqa site built on [`pagewright`]. A YAML suite file names
//! the base URL, the browser, the retry policy and the scenarios to run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagewright_suite::{Runner, SuiteConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> pagewright_suite::Result<()> {
//! let config = SuiteConfig::load("configs/demoqa.yaml")?;
//! // Chrome is launched only when a scenario needs it
//! let runner = Runner::for_suite(&config).await?;
//! for result in runner.run(&config).await {
//!     println!("{}: {}", result.scenario, result.success);
//! }
//! runner.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod config;
pub mod data;
pub mod pages;
mod runner;

pub use api::AccountApi;
pub use config::{
    BrowserConfig, OnFailure, ParamDef, Params, RetryConfig, Scenario, SuiteConfig, Viewport,
};
pub use pages::{BasePage, FormEntry, TextBoxPage};
pub use runner::{RunResult, Runner};

/// Result type for suite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or running a suite.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Interaction(#[from] pagewright::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {actual}, expected {expected}")]
    UnexpectedStatus {
        endpoint: String,
        expected: u16,
        actual: u16,
    },

    #[error("assertion failed: {0}")]
    AssertionFailed(String),
}
