use serde_json::Value;

use crate::schema::{canonical_key, get_lenient};

/// Description used when a schema has no usable properties.
pub const FALLBACK_DESCRIPTION: &str = "the requested data";

/// Describe a schema as a short field list, e.g.
/// `name (string), status (string, one of: active, inactive)`.
///
/// Reads keys in either form. Anything that is not a mapping with a non-empty `properties`
/// mapping yields [`FALLBACK_DESCRIPTION`].
pub fn describe(schema: &Value) -> String {
	let properties = schema
		.as_object()
		.and_then(|schema| get_lenient(schema, "properties"))
		.and_then(Value::as_object)
		.filter(|properties| !properties.is_empty());

	let Some(properties) = properties else {
		return FALLBACK_DESCRIPTION.to_string();
	};

	properties
		.iter()
		.map(|(name, property)| describe_property(canonical_key(name), property))
		.collect::<Vec<_>>()
		.join(", ")
}

fn describe_property(name: &str, property: &Value) -> String {
	let property = property.as_object();
	let kind = property
		.and_then(|p| get_lenient(p, "type"))
		.map(value_text)
		.unwrap_or_else(|| "any".to_string());
	let choices = property
		.and_then(|p| get_lenient(p, "enum"))
		.and_then(Value::as_array)
		.filter(|values| !values.is_empty());

	match choices {
		Some(values) => {
			let values = values.iter().map(value_text).collect::<Vec<_>>().join(", ");
			format!("{name} ({kind}, one of: {values})")
		}
		None => format!("{name} ({kind})"),
	}
}

fn value_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

// region:    --- Tests


// endregion: --- Tests
