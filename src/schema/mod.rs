//! JSON Schema handling for structured generation.
//!
//! A schema enters the crate as a `serde_json::Value` whose keys may be written in plain form
//! (`"type"`) or in symbol notation (`":type"`, as emitted by configs that serialize symbol
//! keys). [`Schema::normalize`] rewrites every key to the plain form once, at the boundary.
//! Everything downstream works on a [`Schema`] and never re-checks key forms.

// region:    --- Modules

mod describer;
mod grammar;
mod normalize;
mod validator;

pub use describer::*;
pub use grammar::*;
pub use normalize::*;
pub use validator::*;

// endregion: --- Modules

use serde::Serialize;
use serde_json::Value;

use crate::Result;

/// A JSON schema with canonical (plain) keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema(Value);

/// Constructors
impl Schema {
	/// Normalize the key form of `value` (recursively) and wrap it.
	pub fn normalize(value: Value) -> Self {
		Self(normalize_keys(value))
	}
}

/// Getters
impl Schema {
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}

	/// The `required` field names, in declared order.
	pub fn required_fields(&self) -> Vec<&str> {
		self.0
			.get("required")
			.and_then(Value::as_array)
			.map(|fields| fields.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}
}

/// Validation & description
impl Schema {
	/// Every violation of the structured-generation schema rules. Empty when valid.
	pub fn validation_errors(&self) -> Vec<String> {
		validation_errors(&self.0)
	}

	/// Ok when valid, otherwise `Error::SchemaInvalid` with the full report.
	pub fn validate(&self) -> Result<()> {
		ensure_valid(&self.0)
	}

	/// Same as `validate`, with the report echoing `received`, the value this schema was
	/// normalized from.
	pub fn validate_received(&self, received: &Value) -> Result<()> {
		ensure_valid_echoing(&self.0, received)
	}

	pub fn is_valid(&self) -> bool {
		self.validation_errors().is_empty()
	}

	/// Short human-readable field list, used in generation instructions.
	pub fn describe(&self) -> String {
		describe(&self.0)
	}
}
