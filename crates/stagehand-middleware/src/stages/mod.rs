//! Built-in stages.
//!
//! ## Error Responders
//!
//! 1. [`client_error`] - Shape client errors into handled responses
//! 2. [`service_error`] - Log service errors; mask them in gateway mode
//!
//! ## Observation
//!
//! 3. [`io_logging`] - Log the event and the outcome
//!
//! ## Gateway Decoration
//!
//! 4. [`cors`] - CORS headers
//! 5. [`security_headers`] - Security headers, catch-all 500
//! 6. [`json_body`] - Parse JSON request bodies
//!
//! ## Request Gate
//!
//! 7. [`validation`] - Validate the event against a schema
//!
//! ## Response Encoding
//!
//! 8. [`serializer`] - Serialize response bodies

pub mod client_error;
pub mod cors;
pub mod io_logging;
pub mod json_body;
pub mod security_headers;
pub mod serializer;
pub mod service_error;
pub mod validation;

// Re-export main types
pub use client_error::ClientErrorStage;
pub use cors::{CorsConfig, CorsInput, CorsStage};
pub use io_logging::IoLoggingStage;
pub use json_body::JsonBodyParserStage;
pub use security_headers::{SecurityHeadersConfig, SecurityHeadersStage};
pub use serializer::ResponseSerializerStage;
pub use service_error::ServiceErrorStage;
pub use validation::EventValidationStage;
