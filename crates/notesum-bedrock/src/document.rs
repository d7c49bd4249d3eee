//! Conversion between `serde_json::Value` and the Smithy `Document` type the
//! Converse API uses for tool schemas and tool inputs.

use std::collections::HashMap;

use aws_smithy_types::{Document, Number};
use serde_json::{Map, Value};

pub fn json_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

pub fn document_to_json(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        // Non-finite floats have no JSON form.
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn schema_survives_conversion() {
        let schema = json!({
            "type": "object",
            "properties": {
                "sql": { "type": "string" },
                "limit": { "type": "integer", "minimum": -1, "maximum": 100 },
                "ratio": { "type": "number", "default": 0.5 },
                "end_date": { "type": ["string", "null"] },
                "strict": true
            },
            "required": ["sql"]
        });
        assert_eq!(document_to_json(&json_to_document(&schema)), schema);
    }

    #[test]
    fn negative_and_positive_integers_use_matching_variants() {
        assert!(matches!(
            json_to_document(&json!(7)),
            Document::Number(Number::PosInt(7))
        ));
        assert!(matches!(
            json_to_document(&json!(-7)),
            Document::Number(Number::NegInt(-7))
        ));
    }

    #[test]
    fn non_finite_float_becomes_null() {
        let doc = Document::Number(Number::Float(f64::NAN));
        assert_eq!(document_to_json(&doc), Value::Null);
    }
}
