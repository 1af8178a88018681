//! Test fixtures shared across Stagehand crates.
//!
//! [`RecordingLogSink`] captures every call made to the log channel so tests
//! can assert on what was logged, and how often.

use crate::{LogSink, Schema};
use parking_lot::Mutex;
use serde_json::Value;

/// Log level of a recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// A `debug` call.
    Debug,
    /// An `error` call.
    Error,
}

/// A single recorded log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Level the entry was logged at.
    pub level: LogLevel,
    /// Message name, e.g. `handler.input`.
    pub message: String,
    /// Structured metadata.
    pub metadata: Value,
}

/// A thread-safe [`LogSink`] that records every call.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::fixtures::RecordingLogSink;
/// use stagehand_core::LogSink;
///
/// let sink = RecordingLogSink::new();
/// sink.debug("handler.input", &json!({ "event": {} }));
/// assert_eq!(sink.debug_count(), 1);
/// assert_eq!(sink.records()[0].message, "handler.input");
/// ```
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded call, in order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Returns the number of `debug` calls.
    pub fn debug_count(&self) -> usize {
        self.count(LogLevel::Debug)
    }

    /// Returns the number of `error` calls.
    pub fn error_count(&self) -> usize {
        self.count(LogLevel::Error)
    }

    /// Returns the records logged with the given message name.
    pub fn with_message(&self, message: &str) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.message == message)
            .cloned()
            .collect()
    }

    /// Clears all records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn count(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .count()
    }

    fn push(&self, level: LogLevel, message: &str, metadata: &Value) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
            metadata: metadata.clone(),
        });
    }
}

impl LogSink for RecordingLogSink {
    fn debug(&self, message: &str, metadata: &Value) {
        self.push(LogLevel::Debug, message, metadata);
    }

    fn error(&self, message: &str, metadata: &Value) {
        self.push(LogLevel::Error, message, metadata);
    }
}

/// A schema requiring `throwClientError` and `throwServiceError` booleans.
///
/// Used by tests whose logic chooses which kind of error to raise.
pub fn error_switch_schema() -> Schema {
    Schema::object()
        .key("throwClientError", Schema::boolean().required())
        .key("throwServiceError", Schema::boolean().required())
}

/// A schema for a gateway event whose parsed body must hold a `name` string.
pub fn gateway_body_schema() -> Schema {
    Schema::object()
        .allow_unknown()
        .key(
            "body",
            Schema::object().key("name", Schema::string().required()).required(),
        )
}
