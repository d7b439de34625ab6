//! Schema-driven payload validation
//!
//! Resource properties arrive over a loosely-typed transport where everything
//! tends to degrade to strings. A [`Schema`] describes the expected shape as
//! data - field names, [`Shape`]s, optionality - and validation coerces the
//! raw payload into that shape or reports every violation as a
//! [`ValidationError`] value. Nothing here panics on malformed input.
//!
//! ```
//! use typed_resources_core::schema::{Schema, Shape};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("path", Shape::String)
//!     .optional("optionalBool", Shape::Boolean);
//!
//! let validated = schema.validate(&json!({ "path": "/tmp", "optionalBool": "true" }))?;
//! assert_eq!(validated["optionalBool"], json!(true));
//! # Ok::<(), typed_resources_core::error::ValidationError>(())
//! ```

use crate::error::{Issue, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

/// Declarative description of one value's expected shape
///
/// Shapes are data, not code: composing them builds a description the
/// validator interprets, which keeps the dispatcher agnostic to any concrete
/// resource schema.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A string; no coercion is applied
    String,
    /// A boolean; the strings `"true"` and `"false"` are coerced
    Boolean,
    /// A number; numeric-looking strings are coerced
    Number,
    /// A value that, after coercion through `shape`, must equal `value`
    Literal {
        /// Shape the raw value is coerced through first
        shape: Box<Shape>,
        /// Exact constant the coerced value must equal
        value: Value,
    },
    /// An array whose every element matches the inner shape
    List(Box<Shape>),
    /// A nested object validated against its own schema
    Object(Schema),
    /// Any value, passed through untouched
    Any,
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    shape: Shape,
    optional: bool,
}

/// An object schema: named fields, each with a shape and optionality
///
/// Unknown keys in the input are stripped from the validated output; the
/// schema describes everything a handler is allowed to see.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create an empty schema
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare a required field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(Field {
            name: name.into(),
            shape,
            optional: false,
        });
        self
    }

    /// Declare an optional field
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(Field {
            name: name.into(),
            shape,
            optional: true,
        });
        self
    }

    /// Validate and coerce a value against this schema
    ///
    /// Collects every issue before failing, so the error names all offending
    /// fields at once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the value is not an object or any
    /// declared field is missing, mistyped, or uncoercible.
    pub fn validate(&self, value: &Value) -> Result<Map<String, Value>, ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::single("", "expected an object"));
        };
        self.validate_object(map)
    }

    /// Validate and coerce an already-parsed object map
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any declared field is missing,
    /// mistyped, or uncoercible.
    pub fn validate_object(&self, map: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut issues = Vec::new();
        let validated = self.coerce_object(map, "", &mut issues);
        if issues.is_empty() {
            Ok(validated)
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Validate a value and deserialize the coerced result into `T`
    ///
    /// This is the typed half of the contract: the schema recovers a
    /// statically-typed value from the untyped transport payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if schema validation fails, or if the
    /// coerced value does not deserialize into `T` (the declared type and the
    /// schema disagree).
    pub fn validate_as<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ValidationError> {
        let validated = self.validate(value)?;
        serde_json::from_value(Value::Object(validated)).map_err(|err| {
            ValidationError::single("", format!("validated value does not match the declared type: {err}"))
        })
    }

    fn coerce_object(
        &self,
        map: &Map<String, Value>,
        path: &str,
        issues: &mut Vec<Issue>,
    ) -> Map<String, Value> {
        let mut validated = Map::new();
        for field in &self.fields {
            let field_path = join_path(path, &field.name);
            match map.get(&field.name) {
                Some(value) => {
                    if let Some(coerced) = coerce(&field.shape, value, &field_path, issues) {
                        validated.insert(field.name.clone(), coerced);
                    }
                }
                None if field.optional => {}
                None => issues.push(Issue::new(field_path, "required field is missing")),
            }
        }
        validated
    }
}

/// Coerce one value through a shape, recording issues on failure.
fn coerce(shape: &Shape, value: &Value, path: &str, issues: &mut Vec<Issue>) -> Option<Value> {
    match shape {
        Shape::Any => Some(value.clone()),

        Shape::String => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => {
                issues.push(Issue::new(path, "expected a string"));
                None
            }
        },

        Shape::Boolean => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) if s == "true" => Some(Value::Bool(true)),
            Value::String(s) if s == "false" => Some(Value::Bool(false)),
            _ => {
                issues.push(Issue::new(path, "expected a boolean"));
                None
            }
        },

        Shape::Number => match value {
            Value::Number(n) => Some(Value::Number(n.clone())),
            Value::String(s) => match parse_number(s) {
                Some(n) => Some(Value::Number(n)),
                None => {
                    issues.push(Issue::new(path, "expected a number"));
                    None
                }
            },
            _ => {
                issues.push(Issue::new(path, "expected a number"));
                None
            }
        },

        Shape::Literal { shape, value: expected } => {
            let coerced = coerce(shape, value, path, issues)?;
            if &coerced == expected {
                Some(coerced)
            } else {
                issues.push(Issue::new(path, format!("expected the literal value {expected}")));
                None
            }
        }

        Shape::List(inner) => match value {
            Value::Array(items) => {
                let coerced: Vec<Option<Value>> = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| coerce(inner, item, &format!("{path}[{index}]"), issues))
                    .collect();
                // Only succeed if every element coerced; issues already recorded.
                coerced.into_iter().collect::<Option<Vec<Value>>>().map(Value::Array)
            }
            _ => {
                issues.push(Issue::new(path, "expected an array"));
                None
            }
        },

        Shape::Object(schema) => match value {
            Value::Object(map) => {
                let before = issues.len();
                let validated = schema.coerce_object(map, path, issues);
                (issues.len() == before).then(|| Value::Object(validated))
            }
            _ => {
                issues.push(Issue::new(path, "expected an object"));
                None
            }
        },
    }
}

/// Parse a numeric-looking string, preferring integer representation.
fn parse_number(s: &str) -> Option<Number> {
    if let Ok(int) = s.parse::<i64>() {
        return Some(Number::from(int));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
