use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function tool specification.
///
/// Local models do not support tool calling; this type only exists so a host framework can
/// pass its request through unchanged and get a clear rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
	pub name: String,
	pub description: Option<String>,
	pub schema: Option<Value>,
}

/// Constructor
impl Tool {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: None,
			schema: None,
		}
	}
}

/// Chainable Setters
impl Tool {
	#[must_use]
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	#[must_use]
	pub fn with_schema(mut self, schema: Value) -> Self {
		self.schema = Some(schema);
		self
	}
}
