//! Input/output logger.
//!
//! Emits exactly two debug records per invocation:
//!
//! - `handler.input` with `{ event }` before the logic runs;
//! - `handler.output` with `{ response }` once the invocation settles, or
//!   with `{ errorMessage, stackTrace }` when an error reached this stage
//!   without a response.
//!
//! The logger never alters the response and never logs at error level.
//!
//! # Pipeline Position
//!
//! Third in both modes. Its before-hook therefore sees the raw event, ahead
//! of body parsing and validation, and on success its after-hook is among
//! the last to run, so it sees the shaped response.

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::{BeforeOutcome, Stage};
use crate::types::Response;
use serde_json::json;
use stagehand_core::{messages, HandlerError, SharedLogSink};

/// Logs the event and the outcome of each invocation.
#[derive(Clone)]
pub struct IoLoggingStage {
    log: SharedLogSink,
}

impl IoLoggingStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(log: SharedLogSink) -> Self {
        Self { log }
    }
}

impl std::fmt::Debug for IoLoggingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoLoggingStage").finish_non_exhaustive()
    }
}

impl Stage for IoLoggingStage {
    fn name(&self) -> &'static str {
        StageKind::IoLogging.name()
    }

    fn before(&self, invocation: &Invocation) -> Result<BeforeOutcome, HandlerError> {
        self.log
            .debug(messages::INPUT, &json!({ "event": invocation.event() }));
        Ok(BeforeOutcome::Continue)
    }

    fn after(&self, _invocation: &Invocation, response: Response) -> Result<Response, HandlerError> {
        self.log
            .debug(messages::OUTPUT, &json!({ "response": &response }));
        Ok(response)
    }

    fn on_error(
        &self,
        _invocation: &Invocation,
        error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        let metadata = match &response {
            Some(response) => json!({ "response": response }),
            None => json!({
                "errorMessage": error.message(),
                "stackTrace": error.stack_trace(),
            }),
        };
        self.log.debug(messages::OUTPUT, &metadata);
        response
    }
}
