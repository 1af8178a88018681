//! The debug/error log channel used by logging stages.

use serde_json::Value;
use std::sync::Arc;

/// Fixed log message names.
pub mod messages {
    /// Emitted before the logic runs, with `{ event }`.
    pub const INPUT: &str = "handler.input";
    /// Emitted once the invocation settles, with `{ response }` or the error.
    pub const OUTPUT: &str = "handler.output";
    /// Emitted once per service error, with `{ errorMessage, stackTrace }`.
    pub const ERROR: &str = "handler.error";
}

/// A structured, fire-and-forget log channel.
///
/// Implementations must not block or fail; a sink that cannot deliver a
/// record drops it.
pub trait LogSink: Send + Sync + 'static {
    /// Records a debug-level entry.
    fn debug(&self, message: &str, metadata: &Value);

    /// Records an error-level entry.
    fn error(&self, message: &str, metadata: &Value);
}

/// A log sink shared between handlers and stages.
pub type SharedLogSink = Arc<dyn LogSink>;

/// A [`LogSink`] built from two closures.
///
/// # Example
///
/// ```
/// use stagehand_core::{FnLogSink, LogSink};
/// use serde_json::json;
///
/// let sink = FnLogSink::new(
///     |message, metadata| println!("DEBUG {message} {metadata}"),
///     |message, metadata| eprintln!("ERROR {message} {metadata}"),
/// );
/// sink.debug("handler.input", &json!({ "event": {} }));
/// ```
pub struct FnLogSink<D, E> {
    debug: D,
    error: E,
}

impl<D, E> FnLogSink<D, E>
where
    D: Fn(&str, &Value) + Send + Sync + 'static,
    E: Fn(&str, &Value) + Send + Sync + 'static,
{
    /// Creates a sink from a debug function and an error function.
    pub const fn new(debug: D, error: E) -> Self {
        Self { debug, error }
    }
}

impl<D, E> LogSink for FnLogSink<D, E>
where
    D: Fn(&str, &Value) + Send + Sync + 'static,
    E: Fn(&str, &Value) + Send + Sync + 'static,
{
    fn debug(&self, message: &str, metadata: &Value) {
        (self.debug)(message, metadata);
    }

    fn error(&self, message: &str, metadata: &Value) {
        (self.error)(message, metadata);
    }
}
