//! JSON request body parser.
//!
//! Gateway events carry the request body as a string. When the request's
//! `Content-Type` is JSON (`application/json` or any `application/*+json`),
//! this stage parses the body and rewrites the event so that validation and
//! the logic see a structured value. Base64-encoded bodies are decoded
//! first.
//!
//! Malformed JSON is the caller's fault and fails the invocation with a
//! client error.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → SecurityHeaders → [JsonBodyParser] → EventValidation → Logic
//! ```

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::{BeforeOutcome, Stage};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use stagehand_core::{ClientError, HandlerError};

const INVALID_JSON: &str = "Content type defined as JSON but an invalid JSON was provided";

/// Parses JSON request bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyParserStage;

impl JsonBodyParserStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Returns `true` for `application/json` and `application/*+json`,
/// ignoring parameters such as `charset`.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

impl Stage for JsonBodyParserStage {
    fn name(&self) -> &'static str {
        StageKind::JsonBodyParser.name()
    }

    fn before(&self, invocation: &Invocation) -> Result<BeforeOutcome, HandlerError> {
        let event = invocation.event();
        let Some(Value::String(body)) = event.body() else {
            return Ok(BeforeOutcome::Continue);
        };
        if !event.header("content-type").is_some_and(is_json_content_type) {
            return Ok(BeforeOutcome::Continue);
        }

        let base64_encoded = event
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let raw = if base64_encoded {
            STANDARD
                .decode(body)
                .map_err(|_| ClientError::new(INVALID_JSON))?
        } else {
            body.as_bytes().to_vec()
        };

        let parsed: Value =
            serde_json::from_slice(&raw).map_err(|_| ClientError::new(INVALID_JSON))?;
        Ok(BeforeOutcome::Rewrite(event.with_body(parsed)))
    }
}
