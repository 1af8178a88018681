//! Layered configuration loader.
//!
//! Layers apply in order, later ones overriding earlier ones:
//! 1. Defaults (or a development/production preset)
//! 2. A TOML or JSON file, or an inline string
//! 3. Environment variables under a prefix

use std::env;
use std::fs;
use std::path::Path;

use stagehand_middleware::stages::{CorsConfig, CorsInput};

use crate::{ConfigError, HandlerConfig};

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use stagehand_config::ConfigLoader;
///
/// # fn main() -> Result<(), stagehand_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("stagehand.toml")?
///     .with_env_prefix("STAGEHAND")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HandlerConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HandlerConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HandlerConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// ```
    /// use stagehand_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HandlerConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HandlerConfig::production();
        self
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// has an unsupported extension, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`"toml"` or `"json"`).
    ///
    /// ```
    /// use stagehand_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("service_name = \"orders\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.service_name, "orders");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the form `PREFIX__SECTION__KEY`, for example
    /// `STAGEHAND__LOGGING__LEVEL=debug` or
    /// `STAGEHAND__CORS__ORIGINS=https://a.example,https://b.example`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file into the process environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        skip_missing_dotenv(dotenvy::dotenv().map(drop))?;
        Ok(self)
    }

    /// Load variables from a specific `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn with_dotenv_path<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        skip_missing_dotenv(dotenvy::from_path(path))?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<HandlerConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HandlerConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HandlerConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        self.apply_env_vars(env::vars(), prefix)
    }

    fn apply_env_vars(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
        prefix: &str,
    ) -> Result<(), ConfigError> {
        let scope = format!("{prefix}__");
        let mut env_vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(&scope))
            .collect();

        // `*__ENABLED` toggles apply last so `CORS__ENABLED=false` wins.
        env_vars.sort_by(|(a, _), (b, _)| {
            (a.ends_with("__ENABLED"), a).cmp(&(b.ends_with("__ENABLED"), b))
        });

        for (key, value) in &env_vars {
            self.apply_env_var(key, value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let boolean = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };
        let integer = || {
            value
                .parse::<u64>()
                .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
        };

        match parts.as_slice() {
            ["SERVICE_NAME"] => {
                self.config.service_name = value.to_string();
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = boolean()?,
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "JSON_FORMAT"] => self.config.logging.json_format = boolean()?,
            ["LOGGING", "FILE_LINE_INFO"] => self.config.logging.file_line_info = boolean()?,
            ["LOGGING", "INCLUDE_TARGET"] => self.config.logging.include_target = boolean()?,
            ["LOGGING", "SERVICE_NAME"] => {
                self.config.logging.service_name = value.to_string();
            }

            ["VALIDATION", "ABORT_EARLY"] => self.config.validation.abort_early = boolean()?,

            ["CORS", "ENABLED"] => {
                let enabled = boolean()?;
                // An explicit config already means enabled; keep it.
                if !enabled || !matches!(self.config.cors, Some(CorsInput::Config(_))) {
                    self.config.cors = Some(CorsInput::Enabled(enabled));
                }
            }
            ["CORS", "ORIGINS"] => {
                let origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
                self.update_cors(|cors| cors.origins = origins);
            }
            ["CORS", "WITH_CREDENTIALS"] => {
                let enabled = boolean()?;
                self.update_cors(|cors| cors.with_credentials = enabled);
            }
            ["CORS", "MAX_AGE"] => {
                let seconds = integer()?;
                self.update_cors(|cors| cors.max_age = Some(seconds));
            }

            ["SECURITY_HEADERS", "HSTS_MAX_AGE"] => {
                self.config.security_headers.hsts_max_age = integer()?;
            }
            ["SECURITY_HEADERS", "FRAME_OPTIONS"] => {
                self.config.security_headers.frame_options = value.to_string();
            }
            ["SECURITY_HEADERS", "REFERRER_POLICY"] => {
                self.config.security_headers.referrer_policy = value.to_string();
            }

            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }

    /// Turns `cors` into an explicit config, keeping any existing settings.
    fn update_cors(&mut self, update: impl FnOnce(&mut CorsConfig)) {
        let mut cors = self
            .config
            .cors
            .as_ref()
            .and_then(CorsInput::resolve)
            .unwrap_or_default();
        update(&mut cors);
        self.config.cors = Some(CorsInput::Config(cors));
    }
}

fn skip_missing_dotenv(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Err(err) if !err.not_found() => Err(err.into()),
        _ => Ok(()),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
