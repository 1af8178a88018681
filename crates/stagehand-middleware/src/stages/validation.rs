//! Event validation.
//!
//! Checks the event against a schema before the logic runs. A failure is a
//! client error carrying the violations, and the logic is skipped.
//!
//! # Pipeline Position
//!
//! Last before-hook in plain mode; in gateway mode it follows the JSON body
//! parser so the schema sees a structured body.

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::{BeforeOutcome, Stage};
use stagehand_core::{HandlerError, Validator};

/// Validates events against a schema.
///
/// # Example
///
/// ```
/// use stagehand_core::{Schema, Validator};
/// use stagehand_middleware::stages::EventValidationStage;
///
/// let stage = EventValidationStage::new(Validator::new(
///     Schema::object().key("sku", Schema::string().required()),
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct EventValidationStage {
    validator: Validator,
}

impl EventValidationStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Returns the validator.
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl Stage for EventValidationStage {
    fn name(&self) -> &'static str {
        StageKind::EventValidation.name()
    }

    fn before(&self, invocation: &Invocation) -> Result<BeforeOutcome, HandlerError> {
        self.validator.validate(invocation.event().as_value())?;
        Ok(BeforeOutcome::Continue)
    }
}
