//! The invocation event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured input handed to a handler by the hosting platform.
///
/// The pipeline only reads events. Stages that need a different shape (the
/// JSON body parser) build a new event with [`InvocationEvent::with_body`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::InvocationEvent;
///
/// let event = InvocationEvent::new(json!({
///     "httpMethod": "POST",
///     "headers": { "Content-Type": "application/json" },
///     "body": "{\"sku\":\"A-1\"}"
/// }));
///
/// assert_eq!(event.http_method(), Some("POST"));
/// assert_eq!(event.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationEvent(Value);

impl InvocationEvent {
    /// Wraps a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the event and returns the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the `httpMethod` field of a gateway event.
    pub fn http_method(&self) -> Option<&str> {
        self.0.get("httpMethod").and_then(Value::as_str)
    }

    /// Looks up a request header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.0
            .get("headers")
            .and_then(Value::as_object)?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_str())
    }

    /// Returns the `body` field.
    pub fn body(&self) -> Option<&Value> {
        self.0.get("body")
    }

    /// Returns a copy of this event with `body` replaced.
    ///
    /// Non-object events are returned unchanged.
    #[must_use]
    pub fn with_body(&self, body: Value) -> Self {
        let mut value = self.0.clone();
        if let Some(object) = value.as_object_mut() {
            object.insert("body".to_string(), body);
        }
        Self(value)
    }
}

impl From<Value> for InvocationEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<InvocationEvent> for Value {
    fn from(event: InvocationEvent) -> Self {
        event.0
    }
}
