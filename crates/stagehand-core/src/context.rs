//! Invocation context types.
//!
//! The [`InvocationContext`] carries the metadata that accompanies an event
//! (invocation ID, function name, authorizer claims). Stages and logic read
//! it; nothing in the pipeline mutates it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A unique identifier for each invocation, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for log correlation.
///
/// # Example
///
/// ```
/// use stagehand_core::InvocationId;
///
/// let id = InvocationId::new();
/// println!("Invocation ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Creates a new unique invocation ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates an `InvocationId` from an existing UUID.
    ///
    /// Useful when the hosting platform already assigned a request ID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for InvocationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Metadata accompanying a single invocation.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagehand_core::InvocationContext;
///
/// let ctx = InvocationContext::new()
///     .with_function_name("create-order")
///     .with_attribute("claims", json!({ "sub": "user-123" }));
///
/// assert_eq!(ctx.function_name(), Some("create-order"));
/// assert_eq!(ctx.attribute("claims").unwrap()["sub"], "user-123");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Unique identifier for this invocation.
    invocation_id: InvocationId,

    /// Name of the function being invoked, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_name: Option<String>,

    /// Platform-provided attributes (authorizer claims, stage variables).
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl InvocationContext {
    /// Creates a context with a fresh invocation ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with a specific invocation ID.
    #[must_use]
    pub fn with_invocation_id(invocation_id: InvocationId) -> Self {
        Self {
            invocation_id,
            ..Self::default()
        }
    }

    /// Sets the function name.
    #[must_use]
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Returns the invocation ID.
    pub const fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Returns the function name, if set.
    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    /// Returns a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns all attributes.
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invocation_ids_are_unique() {
        assert_ne!(InvocationId::new(), InvocationId::new());
    }

    #[test]
    fn test_invocation_id_display_matches_uuid() {
        let uuid = Uuid::now_v7();
        let id = InvocationId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_context_attributes() {
        let ctx = InvocationContext::new().with_attribute("stage", json!("prod"));
        assert_eq!(ctx.attribute("stage"), Some(&json!("prod")));
        assert!(ctx.attribute("missing").is_none());
        assert_eq!(ctx.attributes().len(), 1);
    }

    #[test]
    fn test_context_with_invocation_id() {
        let id = InvocationId::new();
        let ctx = InvocationContext::with_invocation_id(id);
        assert_eq!(ctx.invocation_id(), id);
        assert!(ctx.function_name().is_none());
    }

    #[test]
    fn test_context_serializes_invocation_id_as_string() {
        let ctx = InvocationContext::new();
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["invocation_id"], json!(ctx.invocation_id().to_string()));
    }
}
