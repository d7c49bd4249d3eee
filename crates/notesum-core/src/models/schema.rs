use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::CoreError;

/// JSON-Schema-shaped contract for a structured model response.
///
/// Only the top level is checked by [`OutputSchema::validate`]: the object
/// shape, the `required` keys and the declared `type` of each present
/// top-level property. Nested constraints are left to the model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

/// Ways a structured response can fail its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing required field `{0}`")]
    MissingRequired(String),

    #[error("field `{field}` should be {expected}, got {actual}")]
    WrongType {
        field: String,
        expected: String,
        actual: &'static str,
    },
}

impl OutputSchema {
    /// Build a schema from a JSON literal.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Value {
        // Serializing a struct of strings and JSON values cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Stable textual form, used as part of cache keys.
    pub fn canonical(&self) -> String {
        self.to_value().to_string()
    }

    /// Check a model response against the top level of this schema.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let object = value
            .as_object()
            .ok_or(SchemaViolation::NotAnObject(json_type_name(value)))?;

        for field in &self.required {
            if !object.contains_key(field) {
                return Err(SchemaViolation::MissingRequired(field.clone()));
            }
        }

        for (field, property) in &self.properties {
            let Some(present) = object.get(field) else {
                continue;
            };
            let allowed = declared_types(property);
            if allowed.is_empty() {
                continue;
            }
            if !allowed.iter().any(|t| type_matches(t, present)) {
                return Err(SchemaViolation::WrongType {
                    field: field.clone(),
                    expected: allowed.join(" or "),
                    actual: json_type_name(present),
                });
            }
        }

        Ok(())
    }
}

/// JSON Schema type name of a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn declared_types(property: &Value) -> Vec<String> {
    match property.get("type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
        "number" => value.is_number(),
        other => other == json_type_name(value),
    }
}
