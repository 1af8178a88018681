//! A [`LogSink`] backed by `tracing`.

use crate::logging::LogConfig;
use serde_json::Value;
use stagehand_core::LogSink;

/// Forwards log-sink calls to `tracing` events.
///
/// `debug` calls become `DEBUG` events and `error` calls become `ERROR`
/// events. The metadata is rendered as a JSON string in the `metadata`
/// field, next to a `service` field.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::LogSink;
/// use stagehand_telemetry::TracingLogSink;
///
/// let sink = TracingLogSink::new("orders");
/// sink.debug("handler.input", &json!({ "event": {} }));
/// ```
#[derive(Debug, Clone)]
pub struct TracingLogSink {
    service: String,
}

impl TracingLogSink {
    /// Creates a sink tagging records with the given service name.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Creates a sink from a logging configuration.
    #[must_use]
    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.service_name.clone())
    }

    /// Returns the service name.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for TracingLogSink {
    fn default() -> Self {
        Self::from_config(&LogConfig::default())
    }
}

impl LogSink for TracingLogSink {
    fn debug(&self, message: &str, metadata: &Value) {
        tracing::debug!(
            service = %self.service,
            metadata = %metadata,
            "{message}"
        );
    }

    fn error(&self, message: &str, metadata: &Value) {
        tracing::error!(
            service = %self.service,
            metadata = %metadata,
            "{message}"
        );
    }
}
