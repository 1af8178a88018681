//! The stage trait.
//!
//! A [`Stage`] contributes up to three hooks to a pipeline. Every hook has a
//! pass-through default, so a stage only implements the phases it cares
//! about.
//!
//! Hooks never mutate shared state. A before-hook that needs to change the
//! event returns [`BeforeOutcome::Rewrite`]; an after-hook returns the
//! response it wants later stages to see; an error hook receives the error
//! by shared reference (it cannot reclassify it) together with the current
//! response slot, and returns the new slot.
//!
//! # Example
//!
//! ```
//! use stagehand_core::HandlerError;
//! use stagehand_middleware::{Invocation, Response, Stage};
//!
//! struct Tagging;
//!
//! impl Stage for Tagging {
//!     fn name(&self) -> &'static str {
//!         "tagging"
//!     }
//!
//!     fn after(&self, _invocation: &Invocation, mut response: Response) -> Result<Response, HandlerError> {
//!         if let Some(object) = response.as_object_mut() {
//!             object.insert("tagged".into(), true.into());
//!         }
//!         Ok(response)
//!     }
//! }
//! ```

use crate::context::Invocation;
use crate::types::Response;
use stagehand_core::{HandlerError, InvocationEvent};

/// What a before-hook wants the pipeline to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeOutcome {
    /// Keep the current event.
    Continue,
    /// Replace the event for all later stages and the logic.
    Rewrite(InvocationEvent),
}

/// A named contributor of before, after, and error hooks.
pub trait Stage: Send + Sync + 'static {
    /// Returns the stage name, used for diagnostics.
    fn name(&self) -> &'static str;

    /// Runs before the logic, in listed order.
    fn before(&self, _invocation: &Invocation) -> Result<BeforeOutcome, HandlerError> {
        Ok(BeforeOutcome::Continue)
    }

    /// Runs after the logic succeeds, in reverse listed order.
    fn after(&self, _invocation: &Invocation, response: Response) -> Result<Response, HandlerError> {
        Ok(response)
    }

    /// Runs when a before-hook, the logic, or an after-hook fails, in listed
    /// order.
    ///
    /// Returning `Some` marks the error as handled; later stages still see
    /// the returned response.
    fn on_error(
        &self,
        _invocation: &Invocation,
        _error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stagehand_core::InvocationContext;

    struct Noop;

    impl Stage for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    #[test]
    fn test_default_hooks_pass_through() {
        let invocation = Invocation::new(InvocationEvent::default(), InvocationContext::new());
        let stage = Noop;

        assert_eq!(stage.before(&invocation).unwrap(), BeforeOutcome::Continue);
        assert_eq!(stage.after(&invocation, json!({ "a": 1 })).unwrap(), json!({ "a": 1 }));

        let error = HandlerError::internal("boom");
        assert_eq!(stage.on_error(&invocation, &error, None), None);
        assert_eq!(
            stage.on_error(&invocation, &error, Some(json!(1))),
            Some(json!(1))
        );
    }
}
