//! Tracing-backed logging for Stagehand.
//!
//! - [`TracingLogSink`] forwards the handler log channel (`handler.input`,
//!   `handler.output`, `handler.error`) to `tracing` events.
//! - [`init_logging`] installs a `tracing-subscriber` registry with JSON or
//!   pretty output.
//!
//! # Example
//!
//! ```rust,ignore
//! use stagehand_telemetry::{init_logging, LogConfig, TracingLogSink};
//!
//! let config = LogConfig::production();
//! init_logging(&config)?;
//! let sink = TracingLogSink::from_config(&config);
//! ```

#![doc(html_root_url = "https://docs.rs/stagehand-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
mod sink;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use sink::TracingLogSink;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
