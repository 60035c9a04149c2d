//! Tool descriptors and the generic argument validator.
//!
//! Schemas are plain data generated from each tool's parameter struct; one
//! validator checks every call against them before a handler runs.

use crate::error::ToolError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A tool as advertised to the host. Built once at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// JSON Schema of a parameter struct.
pub fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).expect("schema serialization should not fail")
}

/// Add a required string property to an object schema.
pub fn with_required_string(mut schema: Value, name: &str, description: &str) -> Value {
    if let Some(object) = schema.as_object_mut() {
        let properties = object
            .entry("properties")
            .or_insert_with(|| json!({}));
        if let Some(properties) = properties.as_object_mut() {
            properties.insert(
                name.to_string(),
                json!({"type": "string", "description": description}),
            );
        }

        let required = object.entry("required").or_insert_with(|| json!([]));
        if let Some(required) = required.as_array_mut() {
            if !required.iter().any(|r| r == name) {
                required.push(json!(name));
            }
        }
    }
    schema
}

/// Check `args` against `schema`.
///
/// Required properties must be present, non-null and, for strings, non-blank.
/// Present non-null values must match the declared `type` (a name or a list
/// of names). Null optional values count as unset.
pub fn validate_arguments(schema: &Value, args: &Map<String, Value>) -> Result<(), ToolError> {
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for name in required.iter().filter_map(Value::as_str) {
        match args.get(name) {
            None | Some(Value::Null) => {
                return Err(ToolError::MissingRequiredArgument(name.to_string()))
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ToolError::MissingRequiredArgument(name.to_string()))
            }
            Some(_) => {}
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (name, value) in args {
        if value.is_null() {
            continue;
        }
        let Some(expected) = properties.get(name).and_then(|p| p.get("type")) else {
            continue;
        };
        if !type_matches(expected, value) {
            return Err(ToolError::InvalidArgument(format!(
                "'{name}' must be of type {}",
                describe_type(expected)
            )));
        }
    }

    Ok(())
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| *name != "null")
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.as_str().unwrap_or("unknown").to_string(),
    }
}
