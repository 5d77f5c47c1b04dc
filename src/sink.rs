//! Where the interaction layer reports what it did.
//!
//! Two channels: *inform* for successful steps and *alert* for failures. The sink is
//! injected into each helper so tests can inspect the events directly.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Severity channel of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Inform,
    Alert,
}

/// A single message emitted by a helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            LogLevel::Inform => "inform",
            LogLevel::Alert => "alert",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Receiver for helper events.
pub trait EventSink: Send + Sync {
    fn inform(&self, message: &str);
    fn alert(&self, message: &str);
}

/// Forwards events to `tracing`: inform as `info`, alert as `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn inform(&self, message: &str) {
        info!(target: "pagewright", "{}", message);
    }

    fn alert(&self, message: &str) {
        warn!(target: "pagewright", "{}", message);
    }
}

/// Keeps every event in memory, in order. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Messages sent to the inform channel.
    pub fn informs(&self) -> Vec<String> {
        self.messages(LogLevel::Inform)
    }

    /// Messages sent to the alert channel.
    pub fn alerts(&self) -> Vec<String> {
        self.messages(LogLevel::Alert)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lock().push(LogEvent {
            level,
            message: message.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        // a panicking test thread must not hide the events from the others
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for RecordingSink {
    fn inform(&self, message: &str) {
        self.push(LogLevel::Inform, message);
    }

    fn alert(&self, message: &str) {
        self.push(LogLevel::Alert, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_separates_channels() {
        let sink = RecordingSink::new();
        sink.inform("located");
        sink.alert("click_element @ src/helper.rs");
        sink.inform("clicked");

        assert_eq!(sink.informs(), vec!["located", "clicked"]);
        assert_eq!(sink.alerts(), vec!["click_element @ src/helper.rs"]);
        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.events()[1].to_string(), "[alert] click_element @ src/helper.rs");
    }

    #[test]
    fn test_clones_share_buffer() {
        let sink = RecordingSink::new();
        let handle = sink.clone();
        handle.inform("hello");
        assert_eq!(sink.informs(), vec!["hello"]);
        sink.clear();
        assert!(handle.events().is_empty());
    }
}
