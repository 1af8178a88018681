//! Handler configuration types.

use serde::{Deserialize, Serialize};
use stagehand_middleware::stages::{CorsInput, SecurityHeadersConfig};
use stagehand_telemetry::{create_env_filter, LogConfig};

use crate::ConfigError;

/// Complete configuration for a handler.
///
/// Unknown fields are rejected so that typos surface at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerConfig {
    /// Name of the service, attached to every log record.
    pub service_name: String,

    /// Logging settings.
    pub logging: LogConfig,

    /// Event validation settings.
    pub validation: ValidationConfig,

    /// CORS settings for gateway handlers; absent disables CORS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsInput>,

    /// Security header settings for gateway handlers.
    pub security_headers: SecurityHeadersConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            service_name: "stagehand".to_string(),
            logging: LogConfig::default(),
            validation: ValidationConfig::default(),
            cors: None,
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

impl HandlerConfig {
    /// Preset for local development: pretty debug logs, all violations reported.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            validation: ValidationConfig { abort_early: false },
            ..Self::default()
        }
    }

    /// Preset for production: JSON logs, first violation only.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the service name is empty, the log level is
    /// not a valid filter directive, or CORS is configured without origins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::missing_field("service_name"));
        }

        if let Err(err) = create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", err.to_string()));
        }

        if let Some(CorsInput::Config(cors)) = &self.cors {
            if cors.origins.is_empty() {
                return Err(ConfigError::invalid_value(
                    "cors.origins",
                    "at least one origin is required",
                ));
            }
        }

        Ok(())
    }

    /// Returns the logging config with the handler's service name applied.
    pub fn effective_logging(&self) -> LogConfig {
        LogConfig {
            service_name: self.service_name.clone(),
            ..self.logging.clone()
        }
    }
}

/// Event validation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Stop at the first violation.
    pub abort_early: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { abort_early: true }
    }
}
