//! Validation of a schema against the minimal shape structured generation needs:
//! an `object` type with a non-empty `properties` mapping of typed properties.
//!
//! All checks run and report independently, so one pass gives the complete list of
//! violations. The only hard stop is a schema that is not a mapping at all.

use serde_json::Value;

use crate::schema::normalize_keys;
use crate::{Error, Result};

/// Max characters of the offending input echoed in the error report.
const ECHO_MAX_CHARS: usize = 200;

const VALID_SCHEMA_EXAMPLE: &str = r#"{
  "type": "object",
  "properties": {
    "name": { "type": "string" },
    "age": { "type": "integer" },
    "status": { "type": "string", "enum": ["active", "inactive"] }
  },
  "required": ["name", "age"]
}"#;

/// Every violation found in `schema` (any key form). Empty when valid.
pub fn validate(schema: &Value) -> Vec<String> {
	validation_errors(&normalize_keys(schema.clone()))
}

/// Ok when `schema` (any key form) is valid, otherwise `Error::SchemaInvalid` carrying every
/// violation, a valid example, and a truncated echo of the input.
pub fn validate_strict(schema: &Value) -> Result<()> {
	ensure_valid_echoing(&normalize_keys(schema.clone()), schema)
}

/// True when `schema` (any key form) is valid.
pub fn is_valid(schema: &Value) -> bool {
	validate(schema).is_empty()
}

// region:    --- Normalized Support

/// Validation of an already normalized schema.
pub(crate) fn validation_errors(schema: &Value) -> Vec<String> {
	let Some(schema) = schema.as_object() else {
		return vec![format!("Schema must be a JSON object, got {}", json_type_name(schema))];
	};

	let mut errors = Vec::new();

	// -- type
	match schema.get("type") {
		None => errors.push("Schema must have a 'type' field (expected 'object')".to_string()),
		Some(Value::String(kind)) if kind == "object" => (),
		Some(other) => errors.push(format!("Schema type must be 'object', got {}", display_value(other))),
	}

	// -- properties
	match schema.get("properties") {
		None => errors.push("Schema must have a 'properties' field".to_string()),
		Some(Value::Object(properties)) if properties.is_empty() => {
			errors.push("Schema 'properties' must not be empty".to_string())
		}
		Some(Value::Object(properties)) => {
			for (name, property) in properties {
				match property.as_object() {
					None => errors.push(format!(
						"Property '{name}' must be an object with a 'type' field, got {}",
						json_type_name(property)
					)),
					Some(property) if !property.contains_key("type") => {
						errors.push(format!("Property '{name}' must have a 'type' field"))
					}
					Some(_) => (),
				}
			}
		}
		Some(other) => errors.push(format!(
			"Schema 'properties' must be an object, got {}",
			json_type_name(other)
		)),
	}

	errors
}

/// `validation_errors` turned into `Error::SchemaInvalid`.
pub(crate) fn ensure_valid(schema: &Value) -> Result<()> {
	ensure_valid_echoing(schema, schema)
}

/// Same as `ensure_valid`, but the report echoes `received` (the caller's input before key
/// normalization).
pub(crate) fn ensure_valid_echoing(schema: &Value, received: &Value) -> Result<()> {
	let errors = validation_errors(schema);
	if errors.is_empty() {
		return Ok(());
	}
	let report = build_report(&errors, received);
	Err(Error::SchemaInvalid { errors, report })
}

fn build_report(errors: &[String], schema: &Value) -> String {
	let mut report = String::from("Invalid schema for structured generation:\n");
	for error in errors {
		report.push_str(&format!("  - {error}\n"));
	}
	report.push_str("\nExample of a valid schema:\n");
	report.push_str(VALID_SCHEMA_EXAMPLE);
	report.push_str("\n\nReceived: ");
	report.push_str(&truncate_echo(&schema.to_string()));
	report
}

fn truncate_echo(text: &str) -> String {
	if text.chars().count() <= ECHO_MAX_CHARS {
		return text.to_string();
	}
	let mut echo: String = text.chars().take(ECHO_MAX_CHARS).collect();
	echo.push_str("...");
	echo
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn display_value(value: &Value) -> String {
	match value {
		Value::String(text) => format!("'{text}'"),
		other => other.to_string(),
	}
}

// endregion: --- Normalized Support

// region:    --- Tests


// endregion: --- Tests
