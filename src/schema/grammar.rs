//! JSON Schema to GBNF Grammar Conversion
//!
//! Converts a JSON schema to the GBNF grammar format used by llama.cpp-style
//! grammar-constrained decoders, so the decoded text always parses as the schema.

use serde_json::{Map, Value};

use crate::schema::normalize_keys;
use crate::{Error, Result};

const WS: &str = "ws";
const JSON_STRING: &str = "json-string";
const JSON_NUMBER: &str = "json-number";
const JSON_INTEGER: &str = "json-integer";
const JSON_BOOLEAN: &str = "json-boolean";
const JSON_NULL: &str = "json-null";
const JSON_VALUE: &str = "json-value";
const JSON_OBJECT: &str = "json-object";
const JSON_ARRAY: &str = "json-array";

/// Converts a JSON schema (any key form) to GBNF grammar format, with `root` as start rule.
pub fn schema_to_gbnf(schema: &Value) -> Result<String> {
	let schema = normalize_keys(schema.clone());
	let mut converter = GrammarConverter::new();
	converter.convert_schema(&schema)
}

struct GrammarConverter {
	/// (name, body) in insertion order
	rules: Vec<(String, String)>,
}

impl GrammarConverter {
	fn new() -> Self {
		Self { rules: Vec::new() }
	}

	fn convert_schema(&mut self, schema: &Value) -> Result<String> {
		self.ensure_rule(WS, r#"[ \t\n]*"#);
		let top = self.convert_value(schema, "root")?;
		if top != "root" {
			self.ensure_rule("root", &top);
		}
		Ok(self.build_grammar())
	}

	/// Returns the name of the rule matching `value`.
	fn convert_value(&mut self, value: &Value, rule_name: &str) -> Result<String> {
		match value {
			Value::Object(obj) => self.convert_object(obj, rule_name),
			Value::Bool(true) => Ok(self.json_value()),
			_ => Err(Error::Internal(format!("Schema must be an object, got: {value}"))),
		}
	}

	fn convert_object(&mut self, obj: &Map<String, Value>, rule_name: &str) -> Result<String> {
		if let Some(Value::Array(choices)) = obj.get("enum") {
			return self.convert_enum(choices, rule_name);
		}

		match obj.get("type") {
			Some(Value::String(schema_type)) => self.convert_typed(obj, schema_type, rule_name),
			// e.g. ["string", "null"]
			Some(Value::Array(types)) => {
				let mut alternatives = Vec::new();
				for (idx, schema_type) in types.iter().filter_map(Value::as_str).enumerate() {
					let alt_name = format!("{rule_name}-{idx}");
					alternatives.push(self.convert_typed(obj, schema_type, &alt_name)?);
				}
				if alternatives.is_empty() {
					return Ok(self.json_value());
				}
				Ok(self.add_rule(rule_name, &alternatives.join(" | ")))
			}
			_ if obj.contains_key("properties") => self.convert_object_type(obj, rule_name),
			_ => Ok(self.json_value()),
		}
	}

	fn convert_typed(&mut self, obj: &Map<String, Value>, schema_type: &str, rule_name: &str) -> Result<String> {
		match schema_type {
			"object" => self.convert_object_type(obj, rule_name),
			"array" => self.convert_array_type(obj, rule_name),
			"string" => Ok(self.primitive(JSON_STRING)),
			"number" => Ok(self.primitive(JSON_NUMBER)),
			"integer" => Ok(self.primitive(JSON_INTEGER)),
			"boolean" => Ok(self.primitive(JSON_BOOLEAN)),
			"null" => Ok(self.primitive(JSON_NULL)),
			_ => Err(Error::Internal(format!("Unsupported schema type: {schema_type}"))),
		}
	}

	fn convert_object_type(&mut self, obj: &Map<String, Value>, rule_name: &str) -> Result<String> {
		let Some(Value::Object(properties)) = obj.get("properties") else {
			return Ok(self.json_value());
		};
		if properties.is_empty() {
			return Ok(self.json_value());
		}

		let required: Vec<&str> = obj
			.get("required")
			.and_then(Value::as_array)
			.map(|names| names.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default();

		let mut required_rules = Vec::new();
		let mut optional_rules = Vec::new();

		for (prop_name, prop_schema) in properties {
			let prop_rule_name = format!("{rule_name}-{}", sanitize_name(prop_name));
			let value_rule = self.convert_value(prop_schema, &prop_rule_name)?;
			let key_literal = gbnf_literal(&serde_json::to_string(prop_name)?);
			let kv_rule = self.add_rule(
				&format!("{prop_rule_name}-kv"),
				&format!("{key_literal} {WS} \":\" {WS} {value_rule}"),
			);

			if required.contains(&prop_name.as_str()) {
				required_rules.push(kv_rule);
			} else {
				optional_rules.push(kv_rule);
			}
		}

		let mut body = format!(r#""{{" {WS}"#);
		let optional_choice = format!("( {} )", optional_rules.join(" | "));

		if !required_rules.is_empty() {
			body.push_str(&format!(" {}", required_rules.join(&format!(r#" {WS} "," {WS} "#))));
			if !optional_rules.is_empty() {
				body.push_str(&format!(r#" ( {WS} "," {WS} {optional_choice} )*"#));
			}
		} else if !optional_rules.is_empty() {
			body.push_str(&format!(
				r#" ( {optional_choice} ( {WS} "," {WS} {optional_choice} )* )?"#
			));
		}

		body.push_str(&format!(r#" {WS} "}}""#));

		Ok(self.add_rule(rule_name, &body))
	}

	fn convert_array_type(&mut self, obj: &Map<String, Value>, rule_name: &str) -> Result<String> {
		let items_rule = match obj.get("items") {
			Some(items_schema) => self.convert_value(items_schema, &format!("{rule_name}-item"))?,
			None => self.json_value(),
		};

		let body = format!(r#""[" {WS} ( {items_rule} ( {WS} "," {WS} {items_rule} )* )? {WS} "]""#);
		Ok(self.add_rule(rule_name, &body))
	}

	fn convert_enum(&mut self, choices: &[Value], rule_name: &str) -> Result<String> {
		if choices.is_empty() {
			return Ok(self.json_value());
		}
		let literals = choices
			.iter()
			.map(|choice| serde_json::to_string(choice).map(|json| gbnf_literal(&json)))
			.collect::<core::result::Result<Vec<_>, _>>()?;
		Ok(self.add_rule(rule_name, &literals.join(" | ")))
	}

	// region:    --- Rule Support

	/// Add a rule under a unique name derived from `base`. Returns the actual name.
	fn add_rule(&mut self, base: &str, body: &str) -> String {
		let mut name = base.to_string();
		let mut counter = 1;
		while self.has_rule(&name) {
			name = format!("{base}{counter}");
			counter += 1;
		}
		self.rules.push((name.clone(), body.to_string()));
		name
	}

	/// Add a shared rule once.
	fn ensure_rule(&mut self, name: &str, body: &str) -> String {
		if !self.has_rule(name) {
			self.rules.push((name.to_string(), body.to_string()));
		}
		name.to_string()
	}

	fn has_rule(&self, name: &str) -> bool {
		self.rules.iter().any(|(existing, _)| existing == name)
	}

	fn primitive(&mut self, name: &str) -> String {
		let body = match name {
			JSON_STRING => {
				r#""\"" ( [^"\\\x7F\x00-\x1F] | "\\" (["\\/bfnrt] | "u" [0-9a-fA-F] [0-9a-fA-F] [0-9a-fA-F] [0-9a-fA-F]) )* "\"""#
			}
			JSON_NUMBER => r#""-"? ([0-9] | [1-9] [0-9]*) ("." [0-9]+)? ([eE] [-+]? [0-9]+)?"#,
			JSON_INTEGER => r#""-"? ([0-9] | [1-9] [0-9]*)"#,
			JSON_BOOLEAN => r#""true" | "false""#,
			_ => r#""null""#,
		};
		self.ensure_rule(name, body)
	}

	/// The generic "any JSON value" rule (and everything it depends on).
	fn json_value(&mut self) -> String {
		for primitive in [JSON_STRING, JSON_NUMBER, JSON_BOOLEAN, JSON_NULL] {
			self.primitive(primitive);
		}
		self.ensure_rule(
			JSON_OBJECT,
			&format!(
				r#""{{" {WS} ( {JSON_STRING} {WS} ":" {WS} {JSON_VALUE} ( {WS} "," {WS} {JSON_STRING} {WS} ":" {WS} {JSON_VALUE} )* )? {WS} "}}""#
			),
		);
		self.ensure_rule(
			JSON_ARRAY,
			&format!(r#""[" {WS} ( {JSON_VALUE} ( {WS} "," {WS} {JSON_VALUE} )* )? {WS} "]""#),
		);
		self.ensure_rule(
			JSON_VALUE,
			&format!("{JSON_OBJECT} | {JSON_ARRAY} | {JSON_STRING} | {JSON_NUMBER} | {JSON_BOOLEAN} | {JSON_NULL}"),
		)
	}

	// endregion: --- Rule Support

	fn build_grammar(&self) -> String {
		let mut grammar = String::new();

		// Add root rule first
		if let Some((name, body)) = self.rules.iter().find(|(name, _)| name == "root") {
			grammar.push_str(&format!("{name} ::= {body}\n"));
		}

		// Add all other rules
		for (name, body) in self.rules.iter().filter(|(name, _)| name != "root") {
			grammar.push_str(&format!("{name} ::= {body}\n"));
		}

		grammar
	}
}

/// GBNF rule names only allow `[a-zA-Z0-9-]`.
fn sanitize_name(name: &str) -> String {
	name.chars()
		.map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
		.collect()
}

/// A GBNF string literal matching `text` exactly.
fn gbnf_literal(text: &str) -> String {
	let mut literal = String::with_capacity(text.len() + 2);
	literal.push('"');
	for c in text.chars() {
		match c {
			'"' => literal.push_str("\\\""),
			'\\' => literal.push_str("\\\\"),
			'\n' => literal.push_str("\\n"),
			'\r' => literal.push_str("\\r"),
			'\t' => literal.push_str("\\t"),
			c => literal.push(c),
		}
	}
	literal.push('"');
	literal
}
