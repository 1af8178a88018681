//! Response body serializer.
//!
//! Gateway logic returns structured bodies; the platform expects a string.
//! This stage serializes any non-string, non-null `body` to JSON and adds
//! `Content-Type: application/json` when no content type was set.
//!
//! It runs on the error path too, so the client error body set by the
//! client error responder leaves the handler as a string.
//!
//! A success value without a valid `statusCode` is rejected as a service
//! error, so the service error responder logs it before masking it as a 500.

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::Stage;
use crate::types::{set_header_if_absent, status_code, Response};
use http::header::CONTENT_TYPE;
use serde_json::Value;
use stagehand_core::HandlerError;

/// Serializes structured response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSerializerStage;

impl ResponseSerializerStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn serialize(mut response: Response) -> Response {
        let Some(body) = response.get_mut("body") else {
            return response;
        };
        if body.is_string() || body.is_null() {
            return response;
        }
        *body = Value::String(body.to_string());
        set_header_if_absent(&mut response, CONTENT_TYPE.as_str(), "application/json");
        response
    }
}

impl Stage for ResponseSerializerStage {
    fn name(&self) -> &'static str {
        StageKind::ResponseSerializer.name()
    }

    fn after(&self, _invocation: &Invocation, response: Response) -> Result<Response, HandlerError> {
        if status_code(&response).is_none() {
            return Err(HandlerError::internal(
                "gateway response is missing a valid statusCode",
            ));
        }
        Ok(Self::serialize(response))
    }

    fn on_error(
        &self,
        _invocation: &Invocation,
        _error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        response.map(Self::serialize)
    }
}
