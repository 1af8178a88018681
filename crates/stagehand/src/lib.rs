//! # Stagehand
//!
//! **Middleware pipelines for serverless handlers**
//!
//! Stagehand wraps a business-logic function with a fixed pipeline of
//! cross-cutting stages so every handler in a fleet validates, logs, and
//! reports errors the same way:
//!
//! - **Two error kinds** – [`ClientError`] (safe to show the caller) and
//!   [`ServiceError`] (logged once, never leaked)
//! - **Schema validation** – events are checked before the logic runs
//! - **Structured I/O logs** – exactly one `handler.input` and one
//!   `handler.output` debug record per invocation
//! - **Gateway shaping** – `{statusCode, headers, body}` results with CORS,
//!   security headers, and JSON bodies
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use stagehand::prelude::*;
//!
//! let handler = ApiGatewayHandler::builder(
//!     |event: InvocationEvent, _ctx: InvocationContext| async move {
//!         let name = event.body().and_then(|b| b.get("name")).cloned();
//!         if name.is_none() {
//!             return Err(HandlerError::bad_request("name is required"));
//!         }
//!         Ok(json!({ "statusCode": 200, "body": { "hello": name } }))
//!     },
//! )
//! .build();
//!
//! let response = tokio_test::block_on(handler.invoke(
//!     json!({
//!         "httpMethod": "POST",
//!         "headers": { "Content-Type": "application/json" },
//!         "body": "{\"name\":\"casey\"}"
//!     }),
//!     InvocationContext::new(),
//! ));
//! assert_eq!(response.status_code, 200);
//! assert_eq!(response.body.as_deref(), Some(r#"{"hello":"casey"}"#));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Plain:   ClientError → ServiceError → IoLogging → Validation → Logic
//! Gateway: ClientError → ServiceError → IoLogging → Cors? → SecurityHeaders
//!          → JsonBody → Validation → Serializer → Logic
//! ```
//!
//! Before-hooks run in that order, after-hooks in reverse, and error hooks
//! in order again.

#![doc(html_root_url = "https://docs.rs/stagehand/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assembly;
mod gateway;
mod standard;

pub use gateway::{create_api_gateway_handler, ApiGatewayHandler, ApiGatewayHandlerBuilder};
pub use standard::{create_standard_handler, StandardHandler, StandardHandlerBuilder};

// Re-export core types
pub use stagehand_core as core;
pub use stagehand_core::fixtures;
pub use stagehand_core::{
    typed, ClientError, HandlerError, HandlerLogic, InvocationContext, InvocationEvent, LogSink,
    Schema, ServiceError, SharedLogSink, Validator,
};

// Re-export middleware types
pub use stagehand_middleware as middleware;
pub use stagehand_middleware::stages::{CorsConfig, CorsInput, SecurityHeadersConfig};
pub use stagehand_middleware::GatewayResponse;

// Re-export telemetry types
pub use stagehand_telemetry as telemetry;
pub use stagehand_telemetry::{init_logging, LogConfig, TracingLogSink};

// Re-export config types
pub use stagehand_config as config;
pub use stagehand_config::{ConfigLoader, HandlerConfig};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use stagehand::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        create_api_gateway_handler, create_standard_handler, ApiGatewayHandler, StandardHandler,
    };

    pub use stagehand_core::{
        typed, ClientError, FnLogSink, HandlerError, InvocationContext, InvocationEvent, LogSink,
        Schema, ServiceError,
    };

    pub use stagehand_middleware::stages::{CorsConfig, CorsInput};
    pub use stagehand_middleware::GatewayResponse;

    pub use stagehand_config::{ConfigLoader, HandlerConfig};
    pub use stagehand_telemetry::{init_logging, TracingLogSink};
}
