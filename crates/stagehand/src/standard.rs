//! Plain-mode handlers.

use crate::assembly::{assemble, StageSettings};
use serde_json::Value;
use stagehand_config::HandlerConfig;
use stagehand_core::{
    HandlerError, HandlerLogic, InvocationContext, InvocationEvent, Schema, SharedLogSink,
    Validator,
};
use stagehand_middleware::stages::SecurityHeadersConfig;
use stagehand_middleware::{HandlerMode, Invocation, Pipeline};
use stagehand_telemetry::TracingLogSink;
use std::sync::Arc;

/// A handler whose results are returned directly.
///
/// Client errors come back as `Ok({errorMessage, errorType, stackTrace})`.
/// Service errors are logged once and returned as `Err` so the hosting
/// platform reports them as faults.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand::{create_standard_handler, HandlerError, InvocationContext, InvocationEvent, Schema};
/// use stagehand::fixtures::RecordingLogSink;
/// use std::sync::Arc;
///
/// let handler = create_standard_handler(
///     |event: InvocationEvent, _ctx: InvocationContext| async move {
///         Ok::<_, HandlerError>(json!({ "echo": event.get("message").cloned() }))
///     },
///     Schema::object().key("message", Schema::string().required()),
///     Arc::new(RecordingLogSink::new()),
/// );
///
/// let result = tokio_test::block_on(
///     handler.invoke(json!({ "message": "hi" }), InvocationContext::new()),
/// );
/// assert_eq!(result.unwrap(), json!({ "echo": "hi" }));
/// ```
#[derive(Clone)]
pub struct StandardHandler {
    pipeline: Pipeline,
    logic: Arc<dyn HandlerLogic>,
}

impl StandardHandler {
    /// Starts building a handler around `logic`.
    pub fn builder(logic: impl HandlerLogic) -> StandardHandlerBuilder {
        StandardHandlerBuilder::new(logic)
    }

    /// Runs one invocation.
    ///
    /// # Errors
    ///
    /// Returns the [`HandlerError`] when a service error was not handled.
    pub async fn invoke(
        &self,
        event: impl Into<InvocationEvent>,
        context: InvocationContext,
    ) -> Result<Value, HandlerError> {
        let invocation = Invocation::new(event.into(), context);
        self.pipeline.invoke(invocation, self.logic.as_ref()).await
    }

    /// Returns the assembled pipeline.
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl std::fmt::Debug for StandardHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardHandler")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Builder for [`StandardHandler`].
pub struct StandardHandlerBuilder {
    logic: Arc<dyn HandlerLogic>,
    schema: Schema,
    log: Option<SharedLogSink>,
    abort_early: bool,
}

impl StandardHandlerBuilder {
    fn new(logic: impl HandlerLogic) -> Self {
        Self {
            logic: Arc::new(logic),
            schema: Schema::any(),
            log: None,
            abort_early: true,
        }
    }

    /// Creates a builder configured from a [`HandlerConfig`].
    ///
    /// The log sink is the `tracing`-backed sink tagged with the configured
    /// service name.
    pub fn from_config(logic: impl HandlerLogic, schema: Schema, config: &HandlerConfig) -> Self {
        Self::new(logic)
            .schema(schema)
            .abort_early(config.validation.abort_early)
            .log(Arc::new(TracingLogSink::from_config(&config.effective_logging())))
    }

    /// Sets the event schema. Without one every event is accepted.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the log sink. Defaults to [`TracingLogSink`].
    #[must_use]
    pub fn log(mut self, log: SharedLogSink) -> Self {
        self.log = Some(log);
        self
    }

    /// Sets whether validation stops at the first violation (default `true`).
    #[must_use]
    pub const fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    /// Assembles the handler.
    #[must_use]
    pub fn build(self) -> StandardHandler {
        let settings = StageSettings {
            mode: HandlerMode::Standard,
            log: self
                .log
                .unwrap_or_else(|| Arc::new(TracingLogSink::default())),
            validator: Validator::new(self.schema).abort_early(self.abort_early),
            cors: None,
            security_headers: SecurityHeadersConfig::default(),
        };
        StandardHandler {
            pipeline: assemble(&settings),
            logic: self.logic,
        }
    }
}

impl std::fmt::Debug for StandardHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardHandlerBuilder")
            .field("schema", &self.schema)
            .field("abort_early", &self.abort_early)
            .finish_non_exhaustive()
    }
}

/// Builds a plain-mode handler.
pub fn create_standard_handler(
    logic: impl HandlerLogic,
    schema: Schema,
    log: SharedLogSink,
) -> StandardHandler {
    StandardHandler::builder(logic).schema(schema).log(log).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stagehand_core::fixtures::RecordingLogSink;

    async fn echo(event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
        Ok(event.into_value())
    }

    #[tokio::test]
    async fn test_builder_defaults_accept_any_event() {
        let handler = StandardHandler::builder(echo).build();
        let result = handler
            .invoke(json!({ "anything": [1, 2] }), InvocationContext::new())
            .await
            .unwrap();
        assert_eq!(result, json!({ "anything": [1, 2] }));
        assert_eq!(handler.pipeline().stage_count(), 4);
    }

    #[tokio::test]
    async fn test_abort_early_false_reports_every_violation() {
        let sink = Arc::new(RecordingLogSink::new());
        let handler = StandardHandler::builder(echo)
            .schema(stagehand_core::fixtures::error_switch_schema())
            .log(sink)
            .abort_early(false)
            .build();

        let result = handler
            .invoke(json!({ "bananas": true }), InvocationContext::new())
            .await
            .unwrap();
        let message = result["errorMessage"].as_str().unwrap();
        assert!(message.starts_with("Errors on 3 properties were found"));
    }

    #[tokio::test]
    async fn test_from_config_uses_validation_settings() {
        let config = HandlerConfig::development();
        let handler = StandardHandlerBuilder::from_config(
            echo,
            stagehand_core::fixtures::error_switch_schema(),
            &config,
        )
        .build();

        let result = handler
            .invoke(json!({}), InvocationContext::new())
            .await
            .unwrap();
        let message = result["errorMessage"].as_str().unwrap();
        assert!(message.starts_with("Errors on 2 properties were found"));
    }

    #[test]
    fn test_handler_is_clone_and_debug() {
        let handler = StandardHandler::builder(echo).build();
        let copy = handler.clone();
        assert!(format!("{copy:?}").contains("event_validation"));
    }
}
