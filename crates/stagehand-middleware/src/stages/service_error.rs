//! Service error responder.
//!
//! Every service error is logged exactly once through the error channel of
//! the log sink, with `{ errorMessage, stackTrace }`. In gateway mode the
//! error is then masked as a detail-free `{ "statusCode": 500 }`; in plain
//! mode no response is set, so the error propagates to the hosting platform.
//!
//! Client errors are never logged here.
//!
//! # Pipeline Position
//!
//! ```text
//! error → ClientError → [ServiceError] → IoLogging → ...
//! ```

use crate::context::Invocation;
use crate::pipeline::{HandlerMode, StageKind};
use crate::stage::Stage;
use crate::types::{status_only, Response};
use http::StatusCode;
use serde_json::json;
use stagehand_core::{messages, HandlerError, SharedLogSink};

/// Logs and, in gateway mode, masks service errors.
#[derive(Clone)]
pub struct ServiceErrorStage {
    mode: HandlerMode,
    log: SharedLogSink,
}

impl ServiceErrorStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(mode: HandlerMode, log: SharedLogSink) -> Self {
        Self { mode, log }
    }
}

impl std::fmt::Debug for ServiceErrorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceErrorStage")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Stage for ServiceErrorStage {
    fn name(&self) -> &'static str {
        StageKind::ServiceError.name()
    }

    fn on_error(
        &self,
        _invocation: &Invocation,
        error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        let HandlerError::Service(service) = error else {
            return response;
        };

        self.log.error(
            messages::ERROR,
            &json!({
                "errorMessage": service.message(),
                "stackTrace": service.stack_trace(),
            }),
        );

        match self.mode {
            HandlerMode::Standard => response,
            HandlerMode::ApiGateway => {
                Some(response.unwrap_or_else(|| status_only(StatusCode::INTERNAL_SERVER_ERROR)))
            }
        }
    }
}
