//! Client error responder.
//!
//! Turns a client-caused error into a handled response that is safe to
//! return to the caller. Service errors pass through untouched.
//!
//! # Pipeline Position
//!
//! First in both modes, so its error hook fires before any other:
//!
//! ```text
//! error → [ClientError] → ServiceError → IoLogging → ...
//! ```
//!
//! # Response Shapes
//!
//! Plain mode returns the error as a value:
//!
//! ```json
//! { "errorMessage": "bad request", "errorType": "BadRequestError", "stackTrace": "..." }
//! ```
//!
//! Gateway mode returns a 400 whose body omits the stack trace:
//!
//! ```json
//! { "statusCode": 400, "body": { "errorMessage": "bad request", "errorType": "BadRequestError" } }
//! ```

use crate::context::Invocation;
use crate::pipeline::{HandlerMode, StageKind};
use crate::stage::Stage;
use crate::types::{status_only, Response};
use http::StatusCode;
use serde_json::json;
use stagehand_core::{ClientError, HandlerError};

/// Shapes client errors into handled responses.
#[derive(Debug, Clone, Copy)]
pub struct ClientErrorStage {
    mode: HandlerMode,
}

impl ClientErrorStage {
    /// Creates the stage for a handler mode.
    #[must_use]
    pub const fn new(mode: HandlerMode) -> Self {
        Self { mode }
    }

    fn shape(&self, error: &ClientError) -> Response {
        match self.mode {
            HandlerMode::Standard => json!({
                "errorMessage": error.message(),
                "errorType": error.error_type(),
                "stackTrace": error.stack_trace(),
            }),
            HandlerMode::ApiGateway => {
                let mut response = status_only(StatusCode::BAD_REQUEST);
                response["body"] = json!({
                    "errorMessage": error.message(),
                    "errorType": error.error_type(),
                });
                response
            }
        }
    }
}

impl Stage for ClientErrorStage {
    fn name(&self) -> &'static str {
        StageKind::ClientError.name()
    }

    fn on_error(
        &self,
        _invocation: &Invocation,
        error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        match error {
            HandlerError::Client(client) => {
                tracing::debug!(error_type = client.error_type(), "client error handled");
                Some(self.shape(client))
            }
            HandlerError::Service(_) => response,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::invocation;

    #[test]
    fn test_standard_shape() {
        let stage = ClientErrorStage::new(HandlerMode::Standard);
        let error = HandlerError::bad_request("bad request");

        let response = stage.on_error(&invocation(json!({})), &error, None).unwrap();

        assert_eq!(response["errorMessage"], "bad request");
        assert_eq!(response["errorType"], "BadRequestError");
        assert!(response["stackTrace"].as_str().unwrap().contains("bad request"));
    }

    #[test]
    fn test_gateway_shape_has_no_stack_trace() {
        let stage = ClientErrorStage::new(HandlerMode::ApiGateway);
        let error = HandlerError::bad_request("bad request");

        let response = stage.on_error(&invocation(json!({})), &error, None).unwrap();

        assert_eq!(
            response,
            json!({
                "statusCode": 400,
                "body": { "errorMessage": "bad request", "errorType": "BadRequestError" }
            })
        );
    }

    #[test]
    fn test_service_error_passes_through() {
        let stage = ClientErrorStage::new(HandlerMode::ApiGateway);
        let error = HandlerError::internal("boom");
        assert!(stage.on_error(&invocation(json!({})), &error, None).is_none());
    }

    #[test]
    fn test_name() {
        assert_eq!(ClientErrorStage::new(HandlerMode::Standard).name(), "client_error");
    }
}
