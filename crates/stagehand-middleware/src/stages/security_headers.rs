//! Security headers decorator.
//!
//! Adds best-practice security headers to gateway responses. Headers the
//! logic already set are never overwritten.
//!
//! | Header | Default | Applies to |
//! |---|---|---|
//! | `Strict-Transport-Security` | `max-age=15552000; includeSubDomains; preload` | all |
//! | `X-Content-Type-Options` | `nosniff` | all |
//! | `X-DNS-Prefetch-Control` | `off` | all |
//! | `X-Download-Options` | `noopen` | all |
//! | `X-Permitted-Cross-Domain-Policies` | `none` | all |
//! | `Referrer-Policy` | `no-referrer` | all |
//! | `X-Frame-Options` | `DENY` | HTML |
//! | `X-XSS-Protection` | `1; mode=block` | HTML |
//!
//! This stage is also the last line of defence on the error path: an error
//! that no earlier stage handled becomes a bare `{ "statusCode": 500 }`, so
//! the platform never sees a raw fault from a gateway handler.

use crate::context::Invocation;
use crate::pipeline::StageKind;
use crate::stage::Stage;
use crate::types::{header, set_header_if_absent, status_only, Response};
use http::{header as names, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stagehand_core::HandlerError;

/// Security header settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityHeadersConfig {
    /// `max-age` of `Strict-Transport-Security`, in seconds.
    pub hsts_max_age: u64,

    /// Whether HSTS covers subdomains.
    pub hsts_include_subdomains: bool,

    /// Whether to request HSTS preloading.
    pub hsts_preload: bool,

    /// `X-Frame-Options` for HTML responses.
    pub frame_options: String,

    /// `Referrer-Policy` value.
    pub referrer_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age: 15_552_000,
            hsts_include_subdomains: true,
            hsts_preload: true,
            frame_options: "DENY".to_string(),
            referrer_policy: "no-referrer".to_string(),
        }
    }
}

impl SecurityHeadersConfig {
    fn strict_transport_security(&self) -> String {
        let mut value = format!("max-age={}", self.hsts_max_age);
        if self.hsts_include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.hsts_preload {
            value.push_str("; preload");
        }
        value
    }
}

/// Adds security headers to gateway responses.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeadersStage {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }

    fn decorate(&self, mut response: Response) -> Response {
        let html = is_html(&response);
        let config = &self.config;

        set_header_if_absent(
            &mut response,
            names::STRICT_TRANSPORT_SECURITY.as_str(),
            config.strict_transport_security(),
        );
        set_header_if_absent(&mut response, names::X_CONTENT_TYPE_OPTIONS.as_str(), "nosniff");
        set_header_if_absent(&mut response, names::X_DNS_PREFETCH_CONTROL.as_str(), "off");
        set_header_if_absent(&mut response, "x-download-options", "noopen");
        set_header_if_absent(&mut response, "x-permitted-cross-domain-policies", "none");
        set_header_if_absent(
            &mut response,
            names::REFERRER_POLICY.as_str(),
            config.referrer_policy.as_str(),
        );
        if html {
            set_header_if_absent(
                &mut response,
                names::X_FRAME_OPTIONS.as_str(),
                config.frame_options.as_str(),
            );
            set_header_if_absent(&mut response, names::X_XSS_PROTECTION.as_str(), "1; mode=block");
        }
        response
    }
}

fn is_html(response: &Response) -> bool {
    header(response, names::CONTENT_TYPE.as_str())
        .and_then(Value::as_str)
        .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("text/html"))
}

impl Stage for SecurityHeadersStage {
    fn name(&self) -> &'static str {
        StageKind::SecurityHeaders.name()
    }

    fn after(&self, _invocation: &Invocation, response: Response) -> Result<Response, HandlerError> {
        Ok(self.decorate(response))
    }

    fn on_error(
        &self,
        _invocation: &Invocation,
        _error: &HandlerError,
        response: Option<Response>,
    ) -> Option<Response> {
        let response =
            response.unwrap_or_else(|| status_only(StatusCode::INTERNAL_SERVER_ERROR));
        Some(self.decorate(response))
    }
}
