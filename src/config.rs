use serde::Deserialize;
use std::time::Duration;

/// Default wait budget for locating and validating an element.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Interval between polls while waiting on an element condition.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Immutable settings handed to each [`InteractionHelper`](crate::InteractionHelper).
///
/// The same timeout bounds every wait: match count, visibility, enablement and the
/// post-navigation URL check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HelperConfig {
    /// Wait budget in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl HelperConfig {
    /// Config with the given timeout and the default polling interval.
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Polling interval, never longer than the timeout itself.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.clamp(1, self.timeout_ms.max(1)))
    }
}
