//! Response types.
//!
//! Inside the pipeline a response is plain JSON. In gateway mode it is a
//! record with `statusCode`, optional `headers`, and `body`; the helpers in
//! this module read and decorate that record. [`GatewayResponse`] is the
//! typed form handed back to the hosting platform.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The response slot threaded through the pipeline.
pub type Response = Value;

/// A gateway-shaped response.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_middleware::GatewayResponse;
///
/// let response = GatewayResponse::from_value(json!({
///     "statusCode": 200,
///     "body": "{\"hello\":\"there\"}"
/// }));
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.body.as_deref(), Some("{\"hello\":\"there\"}"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status_code: u16,

    /// Response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Serialized body, absent for bodiless responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl GatewayResponse {
    /// Creates a bodiless response.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates the detail-free response used for service failures.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Converts the pipeline's final response.
    ///
    /// A missing or out-of-range `statusCode` yields a 500. Header values
    /// that are not strings are rendered as JSON; a body that is not a
    /// string is serialized.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Some(status) = status_code(&value) else {
            return Self::internal_error();
        };

        let headers = value
            .get("headers")
            .and_then(Value::as_object)
            .map(|headers| {
                headers
                    .iter()
                    .map(|(name, value)| (name.clone(), header_string(value)))
                    .collect()
            })
            .unwrap_or_default();

        let body = match value.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(body)) => Some(body.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Returns the `statusCode` of a gateway response, if valid.
pub fn status_code(response: &Response) -> Option<StatusCode> {
    let code = response.get("statusCode")?.as_u64()?;
    StatusCode::from_u16(u16::try_from(code).ok()?).ok()
}

/// Builds a gateway response record with no body.
pub fn status_only(status: StatusCode) -> Response {
    let mut record = Map::new();
    record.insert("statusCode".to_string(), Value::from(status.as_u16()));
    Value::Object(record)
}

/// Returns `true` if the response carries the header, ignoring case.
pub fn has_header(response: &Response, name: &str) -> bool {
    header(response, name).is_some()
}

/// Looks up a response header, ignoring case.
pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a Value> {
    response
        .get("headers")
        .and_then(Value::as_object)?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Sets a header unless one with the same name (ignoring case) exists.
///
/// Responses that are not objects are left alone. A missing or malformed
/// `headers` field is replaced with an empty object first.
pub fn set_header_if_absent(response: &mut Response, name: &str, value: impl Into<Value>) {
    if has_header(response, name) {
        return;
    }
    let Some(record) = response.as_object_mut() else {
        return;
    };
    let headers = record
        .entry("headers")
        .or_insert_with(|| Value::Object(Map::new()));
    if !headers.is_object() {
        *headers = Value::Object(Map::new());
    }
    if let Some(headers) = headers.as_object_mut() {
        headers.insert(name.to_string(), value.into());
    }
}

fn header_string(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_missing_status_is_500() {
        let response = GatewayResponse::from_value(json!({ "body": "x" }));
        assert_eq!(response, GatewayResponse::internal_error());
    }

    #[test]
    fn test_from_value_invalid_status_is_500() {
        let response = GatewayResponse::from_value(json!({ "statusCode": 70000 }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_value_renders_headers_and_body() {
        let response = GatewayResponse::from_value(json!({
            "statusCode": 201,
            "headers": { "X-Count": 3, "Content-Type": "application/json" },
            "body": { "id": 1 }
        }));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.header("x-count"), Some("3"));
        assert_eq!(response.body.as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let value = serde_json::to_value(GatewayResponse::internal_error()).unwrap();
        assert_eq!(value, json!({ "statusCode": 500 }));
    }

    #[test]
    fn test_set_header_if_absent_keeps_existing() {
        let mut response = json!({ "statusCode": 200, "headers": { "x-frame-options": "SAMEORIGIN" } });
        set_header_if_absent(&mut response, "X-Frame-Options", "DENY");
        set_header_if_absent(&mut response, "Referrer-Policy", "no-referrer");
        assert_eq!(response["headers"]["x-frame-options"], "SAMEORIGIN");
        assert_eq!(response["headers"]["Referrer-Policy"], "no-referrer");
        assert!(response["headers"].get("X-Frame-Options").is_none());
    }

    #[test]
    fn test_set_header_creates_headers_object() {
        let mut response = status_only(StatusCode::OK);
        set_header_if_absent(&mut response, "Vary", "Origin");
        assert_eq!(response, json!({ "statusCode": 200, "headers": { "Vary": "Origin" } }));
    }

    #[test]
    fn test_set_header_ignores_non_objects() {
        let mut response = json!("plain");
        set_header_if_absent(&mut response, "Vary", "Origin");
        assert_eq!(response, json!("plain"));
    }
}
