//! Declarative event validation.
//!
//! A [`Schema`] describes the shape an event must have. It can be built in
//! code or deserialized from a declarative document:
//!
//! ```
//! use serde_json::json;
//! use stagehand_core::{Schema, Validator};
//!
//! let from_code = Schema::object()
//!     .key("sku", Schema::string().required())
//!     .key("quantity", Schema::integer().required());
//!
//! let from_document: Schema = serde_json::from_value(json!({
//!     "type": "object",
//!     "keys": {
//!         "sku": { "type": "string", "required": true },
//!         "quantity": { "type": "integer", "required": true }
//!     }
//! }))
//! .unwrap();
//!
//! assert_eq!(from_code, from_document);
//!
//! let err = Validator::new(from_code)
//!     .validate(&json!({ "sku": "A-1" }))
//!     .unwrap_err();
//! assert_eq!(err.violations()[0].message(), "\"quantity\" is required");
//! ```
//!
//! # Violation vocabulary
//!
//! | Type | Message |
//! |---|---|
//! | `any.required` | `"<label>" is required` |
//! | `string.base` | `"<label>" must be a string` |
//! | `number.base` | `"<label>" must be a number` |
//! | `number.integer` | `"<label>" must be an integer` |
//! | `boolean.base` | `"<label>" must be a boolean` |
//! | `object.base` | `"<label>" must be of type object` |
//! | `array.base` | `"<label>" must be an array` |
//! | `object.unknown` | `"<label>" is not allowed` |
//!
//! The label is the path to the offending value (`address.city`,
//! `tags[0]`), or `value` for the event itself.

use crate::ClientError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::ControlFlow;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    message: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl Violation {
    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the dotted path to the offending value; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the violation type, e.g. `any.required`.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// The type constraint of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaKind {
    /// Any value.
    Any,
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object {
        /// Declared keys, checked in order. `None` accepts any keys.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<IndexMap<String, Schema>>,
        /// Whether keys outside `keys` are accepted.
        #[serde(default, rename = "allowUnknown")]
        allow_unknown: bool,
    },
    /// A JSON array.
    Array {
        /// Schema every element must satisfy.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<Schema>>,
    },
}

/// A declarative description of a valid value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(flatten)]
    kind: SchemaKind,
    #[serde(default)]
    required: bool,
}

impl Schema {
    /// Creates an optional schema of the given kind.
    #[must_use]
    pub const fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    /// Accepts any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Accepts a string.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    /// Accepts a number.
    #[must_use]
    pub const fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    /// Accepts an integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    /// Accepts a boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// Accepts an object with any keys until [`Schema::key`] declares some.
    #[must_use]
    pub const fn object() -> Self {
        Self::new(SchemaKind::Object {
            keys: None,
            allow_unknown: false,
        })
    }

    /// Accepts an array with elements of any shape.
    #[must_use]
    pub const fn array() -> Self {
        Self::new(SchemaKind::Array { items: None })
    }

    /// Marks the value as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares an object key. Ignored on non-object schemas.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let SchemaKind::Object { keys, .. } = &mut self.kind {
            keys.get_or_insert_with(IndexMap::new)
                .insert(name.into(), schema);
        }
        self
    }

    /// Accepts undeclared keys on an object schema.
    #[must_use]
    pub fn allow_unknown(mut self) -> Self {
        if let SchemaKind::Object { allow_unknown, .. } = &mut self.kind {
            *allow_unknown = true;
        }
        self
    }

    /// Sets the element schema of an array schema.
    #[must_use]
    pub fn items(mut self, schema: Schema) -> Self {
        if let SchemaKind::Array { items } = &mut self.kind {
            *items = Some(Box::new(schema));
        }
        self
    }

    /// Returns the type constraint.
    pub const fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Returns `true` if the value must be present.
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Checks events against a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    schema: Schema,
    abort_early: bool,
}

impl Validator {
    /// Creates a validator that stops at the first violation.
    #[must_use]
    pub const fn new(schema: Schema) -> Self {
        Self {
            schema,
            abort_early: true,
        }
    }

    /// Sets whether validation stops at the first violation.
    #[must_use]
    pub const fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    /// Returns the schema.
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns every violation (or only the first, when aborting early).
    pub fn check(&self, value: &Value) -> Vec<Violation> {
        let mut walk = Walk {
            abort_early: self.abort_early,
            violations: Vec::new(),
        };
        let _ = walk.visit(&self.schema, Some(value), &mut Vec::new());
        walk.violations
    }

    /// Validates an event.
    ///
    /// The error message lists the violations and the offending event; the
    /// error also carries the violations.
    pub fn validate(&self, event: &Value) -> Result<(), ClientError> {
        let violations = self.check(event);
        if violations.is_empty() {
            return Ok(());
        }
        let message = failure_message(&violations, event);
        Err(ClientError::new(message).with_violations(violations))
    }
}

/// Validates an event against a schema, stopping at the first violation.
pub fn validate(event: &Value, schema: &Schema) -> Result<(), ClientError> {
    Validator::new(schema.clone()).validate(event)
}

fn failure_message(violations: &[Violation], event: &Value) -> String {
    let details = serde_json::to_string_pretty(violations).unwrap_or_default();
    let event = serde_json::to_string_pretty(event).unwrap_or_default();
    format!(
        "Errors on {} properties were found while validating properties for lambda invocation event:\n{details}\n\nEvent:\n{event}",
        violations.len()
    )
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

struct Path<'a, 'b>(&'b [Segment<'a>]);

impl Path<'_, '_> {
    fn dotted(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match segment {
                Segment::Key(key) => out.push_str(key),
                Segment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for Path<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("value");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

struct Walk {
    abort_early: bool,
    violations: Vec<Violation>,
}

impl Walk {
    fn visit<'a>(
        &mut self,
        schema: &'a Schema,
        value: Option<&'a Value>,
        path: &mut Vec<Segment<'a>>,
    ) -> ControlFlow<()> {
        let Some(value) = value else {
            if schema.required {
                return self.report(path, "any.required", "is required");
            }
            return ControlFlow::Continue(());
        };

        match &schema.kind {
            SchemaKind::Any => ControlFlow::Continue(()),
            SchemaKind::String if !value.is_string() => {
                self.report(path, "string.base", "must be a string")
            }
            SchemaKind::Number if !value.is_number() => {
                self.report(path, "number.base", "must be a number")
            }
            SchemaKind::Integer => match value.as_f64() {
                None => self.report(path, "number.base", "must be a number"),
                Some(n) if n.fract() != 0.0 => {
                    self.report(path, "number.integer", "must be an integer")
                }
                Some(_) => ControlFlow::Continue(()),
            },
            SchemaKind::Boolean if !value.is_boolean() => {
                self.report(path, "boolean.base", "must be a boolean")
            }
            SchemaKind::Object {
                keys,
                allow_unknown,
            } => {
                let Some(object) = value.as_object() else {
                    return self.report(path, "object.base", "must be of type object");
                };
                let Some(keys) = keys else {
                    return ControlFlow::Continue(());
                };
                for (name, child) in keys {
                    path.push(Segment::Key(name));
                    let flow = self.visit(child, object.get(name), path);
                    path.pop();
                    flow?;
                }
                if !allow_unknown {
                    for name in object.keys().filter(|name| !keys.contains_key(*name)) {
                        path.push(Segment::Key(name));
                        let flow = self.report(path, "object.unknown", "is not allowed");
                        path.pop();
                        flow?;
                    }
                }
                ControlFlow::Continue(())
            }
            SchemaKind::Array { items } => {
                let Some(elements) = value.as_array() else {
                    return self.report(path, "array.base", "must be an array");
                };
                if let Some(items) = items {
                    for (index, element) in elements.iter().enumerate() {
                        path.push(Segment::Index(index));
                        let flow = self.visit(items, Some(element), path);
                        path.pop();
                        flow?;
                    }
                }
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn report(&mut self, path: &[Segment<'_>], kind: &str, text: &str) -> ControlFlow<()> {
        let path = Path(path);
        self.violations.push(Violation {
            message: format!("\"{path}\" {text}"),
            path: path.dotted(),
            kind: kind.to_string(),
        });
        if self.abort_early {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
