//! # Stagehand Middleware
//!
//! Hook-chain pipeline and built-in stages for the Stagehand handler
//! framework.
//!
//! A [`Pipeline`] wraps handler logic with an ordered list of [`Stage`]s.
//! Each stage may contribute a before-hook, an after-hook, and an error hook:
//!
//! ```text
//! event → before(1) → before(2) → ... → logic
//!                                          ↓
//! response ← after(1) ← after(2) ← ... ←──┘
//!
//! error → on_error(1) → on_error(2) → ... → handled response or error
//! ```
//!
//! ## Built-in Stages
//!
//! | Stage | Hooks | Purpose |
//! |-------|-------|---------|
//! | `client_error` | error | Client errors become handled responses |
//! | `service_error` | error | Service errors are logged once; masked as 500 in gateway mode |
//! | `io_logging` | before, after, error | `handler.input` / `handler.output` debug logs |
//! | `cors` | after, error | CORS headers |
//! | `security_headers` | after, error | Security headers; unhandled errors become 500 |
//! | `json_body_parser` | before | Parse JSON request bodies |
//! | `event_validation` | before | Schema validation |
//! | `response_serializer` | after, error | Serialize structured bodies |
//!
//! ## Example
//!
//! ```
//! use stagehand_middleware::{HandlerMode, StageKind};
//!
//! let stages = StageKind::for_mode(HandlerMode::ApiGateway, true);
//! assert_eq!(stages.len(), 8);
//! assert_eq!(stages[0].name(), "client_error");
//! assert_eq!(stages[7].name(), "response_serializer");
//! ```

#![doc(html_root_url = "https://docs.rs/stagehand-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod stage;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::Invocation;
pub use pipeline::{BoxedStage, HandlerMode, Pipeline, PipelineBuilder, StageKind};
pub use stage::{BeforeOutcome, Stage};
pub use types::{GatewayResponse, Response};
