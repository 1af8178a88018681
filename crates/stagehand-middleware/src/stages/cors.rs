//! CORS (Cross-Origin Resource Sharing) decorator.
//!
//! Adds CORS headers to whatever gateway response exists, on both the
//! success and the error path. Events without an `httpMethod` are not HTTP
//! requests and are left alone.
//!
//! ## Origin Resolution
//!
//! | Configured origins | Credentials | Request `Origin` | `Access-Control-Allow-Origin` |
//! |---|---|---|---|
//! | `*` | enabled | present | the request origin |
//! | `*` | any | absent | `*` |
//! | `*` | disabled | present | `*` |
//! | explicit list | any | listed | the request origin |
//! | explicit list | any | unlisted or absent | the first listed origin |
//!
//! Browsers reject a wildcard origin on credentialed responses, which is why
//! the wildcard is pinned to the request origin when credentials are on.
//! Whenever the origin is echoed, `Vary: Origin` is added.
//!
//! ## Configuration
//!
//! [`CorsInput`] accepts either a boolean shorthand or a full config:
//!
//! ```
//! use stagehand_middleware::stages::{CorsConfig, CorsInput};
//!
//! let shorthand: CorsInput = serde_json::from_str("true").unwrap();
//! assert_eq!(shorthand.resolve(), Some(CorsConfig::default()));
//!
//! let explicit: CorsInput = serde_json::from_str(
//!     r#"{ "origins": ["https://app.example.com"], "withCredentials": false }"#,
//! )
//! .unwrap();
//! assert_eq!(explicit.resolve().unwrap().origins, vec!["https://app.example.com"]);
//! ```

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::Stage;
use crate::types::{has_header, set_header_if_absent, Response};
use serde::{Deserialize, Serialize};
use stagehand_core::HandlerError;

/// CORS header names.
pub mod headers {
    /// `Access-Control-Allow-Origin` header.
    pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    /// `Access-Control-Allow-Credentials` header.
    pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
    /// `Access-Control-Allow-Headers` header.
    pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
    /// `Access-Control-Max-Age` header.
    pub const MAX_AGE: &str = "Access-Control-Max-Age";
    /// `Vary` header.
    pub const VARY: &str = "Vary";
}

const WILDCARD: &str = "*";

/// CORS settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any.
    #[serde(default = "default_origins")]
    pub origins: Vec<String>,

    /// Whether credentialed requests are allowed.
    #[serde(default = "default_with_credentials", alias = "with_credentials")]
    pub with_credentials: bool,

    /// Request headers the browser may send.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    /// How long, in seconds, a preflight result may be cached.
    #[serde(default, alias = "max_age", skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

fn default_origins() -> Vec<String> {
    vec![WILDCARD.to_string()]
}

const fn default_with_credentials() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_origins(),
            with_credentials: default_with_credentials(),
            headers: Vec::new(),
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Creates a config allowing the given origins, with credentials.
    #[must_use]
    pub fn with_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets whether credentials are allowed.
    #[must_use]
    pub fn credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    /// Adds an allowed request header.
    #[must_use]
    pub fn allow_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Sets the preflight cache duration in seconds.
    #[must_use]
    pub const fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    fn allows_any_origin(&self) -> bool {
        self.origins.iter().any(|origin| origin == WILDCARD)
    }

    /// Picks the `Access-Control-Allow-Origin` value for a request origin.
    ///
    /// Returns the value and whether it echoes the request.
    fn resolve_origin(&self, request_origin: Option<&str>) -> Option<(String, bool)> {
        if self.allows_any_origin() {
            return Some(match request_origin {
                Some(origin) if self.with_credentials => (origin.to_string(), true),
                _ => (WILDCARD.to_string(), false),
            });
        }
        if let Some(origin) = request_origin {
            if self.origins.iter().any(|allowed| allowed == origin) {
                return Some((origin.to_string(), true));
            }
        }
        self.origins.first().map(|first| (first.clone(), false))
    }
}

/// CORS configuration as supplied by a handler author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorsInput {
    /// `true` allows every origin with credentials; `false` disables CORS.
    Enabled(bool),
    /// An explicit configuration.
    Config(CorsConfig),
}

impl CorsInput {
    /// Returns the effective configuration, or `None` when disabled.
    pub fn resolve(&self) -> Option<CorsConfig> {
        match self {
            Self::Enabled(true) => Some(CorsConfig::default()),
            Self::Enabled(false) => None,
            Self::Config(config) => Some(config.clone()),
        }
    }
}

impl From<bool> for CorsInput {
    fn from(enabled: bool) -> Self {
        Self::Enabled(enabled)
    }
}

impl From<CorsConfig> for CorsInput {
    fn from(config: CorsConfig) -> Self {
        Self::Config(config)
    }
}

/// Adds CORS headers to gateway responses.
#[derive(Debug, Clone)]
pub struct CorsStage {
    config: CorsConfig,
}

impl CorsStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &CorsConfig {
        &self.config
    }

    fn decorate(&self, invocation: &Invocation, mut response: Response) -> Response {
        let event = invocation.event();
        if event.http_method().is_none() {
            return response;
        }

        if !has_header(&response, headers::ALLOW_ORIGIN) {
            if let Some((origin, echoed)) = self.config.resolve_origin(event.header("origin")) {
                set_header_if_absent(&mut response, headers::ALLOW_ORIGIN, origin);
                if echoed {
                    set_header_if_absent(&mut response, headers::VARY, "Origin");
                }
            }
        }
        if self.config.with_credentials {
            set_header_if_absent(&mut response, headers::ALLOW_CREDENTIALS, "true");
        }
        if !self.config.headers.is_empty() {
            set_header_if_absent(&mut response, headers::ALLOW_HEADERS, self.config.headers.join(","));
        }
        if let Some(max_age) = self.config.max_age {
            set_header_if_absent(&mut response, headers::MAX_AGE, max_age.to_string());
        }
        response
    }
}

impl Stage for CorsStage {
    fn name(&self) -> &'static str {
        StageKind::Cors.name()
    }

    fn after(&self, invocation: &Invocation, response: Response) -> Result<Response, HandlerError> {
        Ok(self.decorate(invocation, response))
    }

    fn on_error(
        &self,
        invocation: &Invocation,
        _error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        response.map(|response| self.decorate(invocation, response))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::invocation;
    use serde_json::json;

    fn request(origin: Option<&str>) -> Invocation {
        let mut event = json!({ "httpMethod": "GET", "headers": {} });
        if let Some(origin) = origin {
            event["headers"]["origin"] = json!(origin);
        }
        invocation(event)
    }

    fn run(config: CorsConfig, origin: Option<&str>) -> Response {
        CorsStage::new(config)
            .after(&request(origin), json!({ "statusCode": 200 }))
            .unwrap()
    }

    // ========================================================================
    // Origin resolution
    // ========================================================================

    #[test]
    fn test_wildcard_with_credentials_echoes_origin() {
        let response = run(CorsConfig::default(), Some("https://example.com"));
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "https://example.com");
        assert_eq!(response["headers"][headers::ALLOW_CREDENTIALS], "true");
        assert_eq!(response["headers"][headers::VARY], "Origin");
    }

    #[test]
    fn test_wildcard_without_origin_header() {
        let response = run(CorsConfig::default(), None);
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "*");
        assert!(response["headers"].get(headers::VARY).is_none());
    }

    #[test]
    fn test_wildcard_without_credentials_stays_wildcard() {
        let response = run(CorsConfig::default().credentials(false), Some("https://example.com"));
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "*");
        assert!(response["headers"].get(headers::ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_explicit_list_echoes_listed_origin() {
        let config = CorsConfig::with_origins(["https://a.example.com", "https://b.example.com"]);
        let response = run(config, Some("https://b.example.com"));
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "https://b.example.com");
    }

    #[test]
    fn test_explicit_list_falls_back_to_first_origin() {
        let config = CorsConfig::with_origins(["https://a.example.com", "https://b.example.com"]);
        let response = run(config, Some("https://evil.example.com"));
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "https://a.example.com");
        assert!(response["headers"].get(headers::VARY).is_none());
    }

    // ========================================================================
    // Decoration rules
    // ========================================================================

    #[test]
    fn test_optional_headers() {
        let config = CorsConfig::default()
            .allow_header("Content-Type")
            .allow_header("Authorization")
            .max_age(600);
        let response = run(config, None);
        assert_eq!(response["headers"][headers::ALLOW_HEADERS], "Content-Type,Authorization");
        assert_eq!(response["headers"][headers::MAX_AGE], "600");
    }

    #[test]
    fn test_existing_allow_origin_is_kept() {
        let response = CorsStage::new(CorsConfig::default())
            .after(
                &request(Some("https://example.com")),
                json!({ "statusCode": 200, "headers": { "access-control-allow-origin": "https://fixed.example.com" } }),
            )
            .unwrap();
        assert_eq!(
            response["headers"]["access-control-allow-origin"],
            "https://fixed.example.com"
        );
        assert!(response["headers"].get(headers::ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_non_http_event_is_untouched() {
        let response = CorsStage::new(CorsConfig::default())
            .after(&invocation(json!({})), json!({ "statusCode": 200 }))
            .unwrap();
        assert_eq!(response, json!({ "statusCode": 200 }));
    }

    #[test]
    fn test_error_path_decorates_handled_response() {
        let stage = CorsStage::new(CorsConfig::default());
        let error = HandlerError::bad_request("bad request");
        let response = stage
            .on_error(&request(Some("https://example.com")), &error, Some(json!({ "statusCode": 400 })))
            .unwrap();
        assert_eq!(response["headers"][headers::ALLOW_ORIGIN], "https://example.com");
        assert!(stage.on_error(&request(None), &error, None).is_none());
    }

    // ========================================================================
    // Input parsing
    // ========================================================================

    #[test]
    fn test_input_shorthand() {
        assert_eq!(CorsInput::from(true).resolve(), Some(CorsConfig::default()));
        assert_eq!(CorsInput::from(false).resolve(), None);
    }

    #[test]
    fn test_input_defaults_from_partial_config() {
        let input: CorsInput = serde_json::from_value(json!({ "maxAge": 60 })).unwrap();
        let config = input.resolve().unwrap();
        assert_eq!(config.origins, vec!["*"]);
        assert!(config.with_credentials);
        assert_eq!(config.max_age, Some(60));
    }
}
