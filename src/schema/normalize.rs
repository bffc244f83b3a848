use serde_json::{Map, Value};

/// Prefix of a key written in symbol notation (`":type"`).
pub const SYMBOL_KEY_PREFIX: char = ':';

/// The canonical form of a schema key.
pub fn canonical_key(key: &str) -> &str {
	key.trim_start_matches(SYMBOL_KEY_PREFIX)
}

/// Rewrite every mapping key of `value` to its canonical form, recursively
/// (including mappings nested in arrays).
///
/// Idempotent. When two keys collapse to the same canonical key, the last one wins.
pub fn normalize_keys(value: Value) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter()
				.map(|(key, value)| (canonical_key(&key).to_string(), normalize_keys(value)))
				.collect(),
		),
		Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
		other => other,
	}
}

/// Look up `key` in a mapping that may not be normalized yet.
pub(crate) fn get_lenient<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
	map.get(key).or_else(|| {
		map.iter()
			.find(|(candidate, _)| candidate.starts_with(SYMBOL_KEY_PREFIX) && canonical_key(candidate) == key)
			.map(|(_, value)| value)
	})
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_normalize_symbol_keys_recursive() {
		let schema = json!({
			":type": "object",
			":properties": {
				":tags": {":type": "array", ":items": {":type": "string"}},
				"name": {"type": "string"}
			},
			":anyOf": [{":type": "object"}]
		});
		let expected = json!({
			"type": "object",
			"properties": {
				"tags": {"type": "array", "items": {"type": "string"}},
				"name": {"type": "string"}
			},
			"anyOf": [{"type": "object"}]
		});

		assert_eq!(normalize_keys(schema), expected);
	}

	#[test]
	fn test_normalize_idempotent() {
		let schema = json!({"::type": "object", ":properties": {":a": {"type": "string"}}});
		let once = normalize_keys(schema);
		let twice = normalize_keys(once.clone());
		assert_eq!(once, twice);
	}

	#[test]
	fn test_normalize_leaves_values_alone() {
		let schema = json!({"enum": [":keep", "as-is"]});
		assert_eq!(normalize_keys(schema.clone()), schema);
	}

	#[test]
	fn test_get_lenient() {
		let value = json!({":type": "object", "properties": {}});
		let map = value.as_object().unwrap();
		assert_eq!(get_lenient(map, "type"), Some(&json!("object")));
		assert_eq!(get_lenient(map, "properties"), Some(&json!({})));
		assert_eq!(get_lenient(map, "required"), None);
	}
}

// endregion: --- Tests
