//! Per-invocation pipeline state.
//!
//! An [`Invocation`] is what every hook sees: the current event, the
//! read-only context, and when the invocation started. Hooks borrow it
//! immutably; only the pipeline replaces the event, and only when a
//! before-hook asks for it with [`BeforeOutcome::Rewrite`](crate::BeforeOutcome).

use stagehand_core::{InvocationContext, InvocationEvent, InvocationId};
use std::time::{Duration, Instant};

/// The state of one invocation as it flows through the pipeline.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::{InvocationContext, InvocationEvent};
/// use stagehand_middleware::Invocation;
///
/// let invocation = Invocation::new(
///     InvocationEvent::new(json!({ "httpMethod": "GET" })),
///     InvocationContext::new(),
/// );
/// assert_eq!(invocation.event().http_method(), Some("GET"));
/// ```
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The event as seen by later stages and the logic.
    event: InvocationEvent,

    /// Metadata accompanying the event.
    context: InvocationContext,

    /// When the invocation entered the pipeline.
    started_at: Instant,
}

impl Invocation {
    /// Creates a new invocation starting now.
    #[must_use]
    pub fn new(event: InvocationEvent, context: InvocationContext) -> Self {
        Self {
            event,
            context,
            started_at: Instant::now(),
        }
    }

    /// Returns the current event.
    pub const fn event(&self) -> &InvocationEvent {
        &self.event
    }

    /// Returns the context.
    pub const fn context(&self) -> &InvocationContext {
        &self.context
    }

    /// Returns the invocation ID.
    pub const fn invocation_id(&self) -> InvocationId {
        self.context.invocation_id()
    }

    /// Returns the time elapsed since the invocation started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub(crate) fn replace_event(&mut self, event: InvocationEvent) {
        self.event = event;
    }
}
