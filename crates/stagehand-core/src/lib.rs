//! # Stagehand Core
//!
//! Core types and traits for the Stagehand handler framework.
//!
//! This crate provides the foundational types used throughout Stagehand:
//!
//! - [`InvocationEvent`] - The structured input handed to a handler
//! - [`InvocationContext`] - Per-invocation metadata (invocation ID, claims)
//! - [`HandlerError`] - The two-kind error taxonomy ([`ClientError`] vs [`ServiceError`])
//! - [`HandlerLogic`] - The business-logic trait wrapped by the pipeline
//! - [`LogSink`] - The debug/error log channel used by logging stages
//! - [`Schema`] / [`Validator`] - Declarative event validation

#![doc(html_root_url = "https://docs.rs/stagehand-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod event;
pub mod fixtures;
mod handler;
mod log;
pub mod validation;

pub use context::{InvocationContext, InvocationId};
pub use error::{
    is_client_caused, ClientError, ErrorKind, HandlerError, HandlerResult, ServiceError,
    BAD_REQUEST_ERROR_TYPE,
};
pub use event::InvocationEvent;
pub use handler::{typed, BoxFuture, HandlerLogic, Typed};
pub use log::{messages, FnLogSink, LogSink, SharedLogSink};
pub use validation::{validate, Schema, SchemaKind, Validator, Violation};
