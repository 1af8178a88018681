//! Gateway-mode handlers.

use crate::assembly::{assemble, StageSettings};
use stagehand_config::HandlerConfig;
use stagehand_core::{
    HandlerLogic, InvocationContext, InvocationEvent, Schema, SharedLogSink, Validator,
};
use stagehand_middleware::stages::{CorsInput, SecurityHeadersConfig};
use stagehand_middleware::{GatewayResponse, HandlerMode, Invocation, Pipeline};
use stagehand_telemetry::TracingLogSink;
use std::sync::Arc;

/// A handler behind an HTTP gateway.
///
/// Every outcome is a [`GatewayResponse`]: the logic's `statusCode` with a
/// JSON string body on success, `400` with `{errorMessage, errorType}` for
/// client errors, and a bare `500` for service errors.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand::{ApiGatewayHandler, HandlerError, InvocationContext, InvocationEvent};
///
/// let handler = ApiGatewayHandler::builder(
///     |_event: InvocationEvent, _ctx: InvocationContext| async move {
///         Ok::<_, HandlerError>(json!({ "statusCode": 200, "body": { "hello": "there" } }))
///     },
/// )
/// .cors(true)
/// .build();
///
/// let response = tokio_test::block_on(handler.invoke(
///     json!({ "httpMethod": "GET", "headers": { "origin": "https://example.com" } }),
///     InvocationContext::new(),
/// ));
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.body.as_deref(), Some(r#"{"hello":"there"}"#));
/// assert_eq!(response.header("Access-Control-Allow-Origin"), Some("https://example.com"));
/// ```
#[derive(Clone)]
pub struct ApiGatewayHandler {
    pipeline: Pipeline,
    logic: Arc<dyn HandlerLogic>,
}

impl ApiGatewayHandler {
    /// Starts building a handler around `logic`.
    pub fn builder(logic: impl HandlerLogic) -> ApiGatewayHandlerBuilder {
        ApiGatewayHandlerBuilder::new(logic)
    }

    /// Runs one invocation.
    pub async fn invoke(
        &self,
        event: impl Into<InvocationEvent>,
        context: InvocationContext,
    ) -> GatewayResponse {
        let invocation = Invocation::new(event.into(), context);
        match self.pipeline.invoke(invocation, self.logic.as_ref()).await {
            Ok(response) => GatewayResponse::from_value(response),
            Err(error) => {
                tracing::warn!(
                    kind = %error.kind(),
                    "unhandled error escaped the gateway pipeline"
                );
                GatewayResponse::internal_error()
            }
        }
    }

    /// Returns the assembled pipeline.
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl std::fmt::Debug for ApiGatewayHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGatewayHandler")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiGatewayHandler`].
pub struct ApiGatewayHandlerBuilder {
    logic: Arc<dyn HandlerLogic>,
    schema: Schema,
    log: Option<SharedLogSink>,
    abort_early: bool,
    cors: Option<CorsInput>,
    security_headers: SecurityHeadersConfig,
}

impl ApiGatewayHandlerBuilder {
    fn new(logic: impl HandlerLogic) -> Self {
        Self {
            logic: Arc::new(logic),
            schema: Schema::any(),
            log: None,
            abort_early: true,
            cors: None,
            security_headers: SecurityHeadersConfig::default(),
        }
    }

    /// Creates a builder configured from a [`HandlerConfig`].
    pub fn from_config(logic: impl HandlerLogic, schema: Schema, config: &HandlerConfig) -> Self {
        let mut builder = Self::new(logic)
            .schema(schema)
            .abort_early(config.validation.abort_early)
            .security_headers(config.security_headers.clone())
            .log(Arc::new(TracingLogSink::from_config(&config.effective_logging())));
        builder.cors = config.cors.clone();
        builder
    }

    /// Sets the event schema, checked after the body is parsed.
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

    /// Enables CORS: `true`, `false`, or an explicit
    /// [`CorsConfig`](stagehand_middleware::stages::CorsConfig).
    #[must_use]
    pub fn cors(mut self, cors: impl Into<CorsInput>) -> Self {
        self.cors = Some(cors.into());
        self
    }

    /// Overrides the security header settings.
    #[must_use]
    pub fn security_headers(mut self, config: SecurityHeadersConfig) -> Self {
        self.security_headers = config;
        self
    }

    /// Assembles the handler.
    #[must_use]
    pub fn build(self) -> ApiGatewayHandler {
        let settings = StageSettings {
            mode: HandlerMode::ApiGateway,
            log: self
                .log
                .unwrap_or_else(|| Arc::new(TracingLogSink::default())),
            validator: Validator::new(self.schema).abort_early(self.abort_early),
            cors: self.cors.as_ref().and_then(CorsInput::resolve),
            security_headers: self.security_headers,
        };
        ApiGatewayHandler {
            pipeline: assemble(&settings),
            logic: self.logic,
        }
    }
}

impl std::fmt::Debug for ApiGatewayHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGatewayHandlerBuilder")
            .field("schema", &self.schema)
            .field("abort_early", &self.abort_early)
            .field("cors", &self.cors)
            .field("security_headers", &self.security_headers)
            .finish_non_exhaustive()
    }
}

/// Builds a gateway-mode handler. `None` or `Some(false)` leaves CORS off.
pub fn create_api_gateway_handler(
    logic: impl HandlerLogic,
    schema: Schema,
    log: SharedLogSink,
    cors: Option<CorsInput>,
) -> ApiGatewayHandler {
    let mut builder = ApiGatewayHandler::builder(logic).schema(schema).log(log);
    if let Some(cors) = cors {
        builder = builder.cors(cors);
    }
    builder.build()
}
