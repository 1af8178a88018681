//! Sequential hook-chain runner.
//!
//! A [`Pipeline`] runs an ordered list of [`Stage`]s around handler logic:
//!
//! 1. before-hooks, in listed order;
//! 2. the logic;
//! 3. after-hooks, in **reverse** listed order.
//!
//! If a before-hook, the logic, or an after-hook fails, the remaining work
//! is skipped and every stage's error hook runs in listed order, threading
//! the response slot. A filled slot means the error was handled and the
//! pipeline returns `Ok`; an empty slot returns the original error.
//!
//! ## Stage Orders
//!
//! | Position | Plain mode | Gateway mode |
//! |---|---|---|
//! | 1 | client_error | client_error |
//! | 2 | service_error | service_error |
//! | 3 | io_logging | io_logging |
//! | 4 | event_validation | cors (when configured) |
//! | 5 | | security_headers |
//! | 6 | | json_body_parser |
//! | 7 | | event_validation |
//! | 8 | | response_serializer |

use crate::context::Invocation;
use crate::stage::{BeforeOutcome, Stage};
use crate::types::Response;
use stagehand_core::{HandlerError, HandlerLogic};
use std::sync::Arc;
use tracing::Instrument;

/// A type-erased stage that can be stored in a vector.
pub type BoxedStage = Arc<dyn Stage>;

/// An ordered, immutable list of stages.
///
/// The pipeline holds no per-invocation state, so one pipeline can serve
/// any number of concurrent invocations.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::{HandlerError, InvocationContext, InvocationEvent};
/// use stagehand_middleware::stages::ClientErrorStage;
/// use stagehand_middleware::{HandlerMode, Invocation, Pipeline};
///
/// let pipeline = Pipeline::builder()
///     .stage(ClientErrorStage::new(HandlerMode::Standard))
///     .build();
///
/// let logic = |_event: InvocationEvent, _ctx: InvocationContext| async move {
///     Err::<serde_json::Value, _>(HandlerError::bad_request("bad request"))
/// };
///
/// let invocation = Invocation::new(InvocationEvent::new(json!({})), InvocationContext::new());
/// let response = tokio_test::block_on(pipeline.invoke(invocation, &logic)).unwrap();
/// assert_eq!(response["errorMessage"], "bad request");
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedStage>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs one invocation through the pipeline.
    ///
    /// The run is wrapped in a `tracing` span carrying the invocation ID.
    pub async fn invoke(
        &self,
        invocation: Invocation,
        logic: &dyn HandlerLogic,
    ) -> Result<Response, HandlerError> {
        let span = tracing::debug_span!(
            "invocation",
            invocation_id = %invocation.invocation_id(),
        );
        self.run(invocation, logic).instrument(span).await
    }

    async fn run(
        &self,
        mut invocation: Invocation,
        logic: &dyn HandlerLogic,
    ) -> Result<Response, HandlerError> {
        match self.run_hooks(&mut invocation, logic).await {
            Ok(response) => {
                tracing::trace!(elapsed = ?invocation.elapsed(), "invocation succeeded");
                Ok(response)
            }
            Err(error) => self.run_error_hooks(&invocation, error),
        }
    }

    async fn run_hooks(
        &self,
        invocation: &mut Invocation,
        logic: &dyn HandlerLogic,
    ) -> Result<Response, HandlerError> {
        for stage in &self.stages {
            match stage.before(invocation)? {
                BeforeOutcome::Continue => {}
                BeforeOutcome::Rewrite(event) => {
                    tracing::trace!(stage = stage.name(), "event rewritten");
                    invocation.replace_event(event);
                }
            }
        }

        let mut response = logic
            .call(invocation.event().clone(), invocation.context().clone())
            .await?;

        for stage in self.stages.iter().rev() {
            response = stage.after(invocation, response)?;
        }
        Ok(response)
    }

    fn run_error_hooks(
        &self,
        invocation: &Invocation,
        error: HandlerError,
    ) -> Result<Response, HandlerError> {
        tracing::debug!(kind = %error.kind(), "running error hooks");

        let mut slot = None;
        for stage in &self.stages {
            slot = stage.on_error(invocation, &error, slot);
        }

        match slot {
            Some(response) => Ok(response),
            None => Err(error),
        }
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedStage>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<S: Stage>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn boxed_stage(mut self, stage: BoxedStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// How a handler's results are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerMode {
    /// Results are returned or propagated as-is.
    Standard,
    /// Results are `{statusCode, headers, body}` records.
    ApiGateway,
}

/// Every built-in stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Shapes client errors into a handled response.
    ClientError,
    /// Logs service errors; masks them in gateway mode.
    ServiceError,
    /// Logs the event and the outcome.
    IoLogging,
    /// Adds CORS headers.
    Cors,
    /// Adds security headers.
    SecurityHeaders,
    /// Parses JSON request bodies.
    JsonBodyParser,
    /// Validates the event against a schema.
    EventValidation,
    /// Serializes response bodies.
    ResponseSerializer,
}

impl StageKind {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::ServiceError => "service_error",
            Self::IoLogging => "io_logging",
            Self::Cors => "cors",
            Self::SecurityHeaders => "security_headers",
            Self::JsonBodyParser => "json_body_parser",
            Self::EventValidation => "event_validation",
            Self::ResponseSerializer => "response_serializer",
        }
    }

    /// Returns the plain-mode stage order.
    #[must_use]
    pub const fn standard() -> [StageKind; 4] {
        [
            Self::ClientError,
            Self::ServiceError,
            Self::IoLogging,
            Self::EventValidation,
        ]
    }

    /// Returns the gateway-mode stage order.
    #[must_use]
    pub fn api_gateway(cors: bool) -> Vec<StageKind> {
        let mut kinds = vec![Self::ClientError, Self::ServiceError, Self::IoLogging];
        if cors {
            kinds.push(Self::Cors);
        }
        kinds.extend([
            Self::SecurityHeaders,
            Self::JsonBodyParser,
            Self::EventValidation,
            Self::ResponseSerializer,
        ]);
        kinds
    }

    /// Returns the stage order for a mode.
    #[must_use]
    pub fn for_mode(mode: HandlerMode, cors: bool) -> Vec<StageKind> {
        match mode {
            HandlerMode::Standard => Self::standard().to_vec(),
            HandlerMode::ApiGateway => Self::api_gateway(cors),
        }
    }
}
