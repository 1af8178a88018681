//! Typed configuration for Stagehand handlers.
//!
//! Handlers can be assembled entirely in code, but deployments usually want
//! the ambient settings (log level and format, validation strictness, CORS,
//! security headers) outside the binary. This crate loads them in layers:
//! defaults, then a TOML or JSON file, then `PREFIX__SECTION__KEY`
//! environment variables. Unknown fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use stagehand_config::ConfigLoader;
//!
//! # fn main() -> Result<(), stagehand_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("stagehand.toml")?
//!     .with_env_prefix("STAGEHAND")
//!     .load()?;
//!
//! println!("service: {}", config.service_name);
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! service_name = "orders"
//!
//! [logging]
//! level = "info"
//! json_format = true
//!
//! [validation]
//! abort_early = true
//!
//! [cors]
//! origins = ["https://shop.example"]
//! withCredentials = true
//! maxAge = 600
//!
//! [security_headers]
//! hsts_max_age = 15552000
//! frame_options = "DENY"
//! ```
//!
//! `cors` may also be a plain boolean: `cors = true` allows every origin.

#![doc(html_root_url = "https://docs.rs/stagehand-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{HandlerConfig, ValidationConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
