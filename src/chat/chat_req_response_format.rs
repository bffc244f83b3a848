use derive_more::From;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The chat response format for structured output.
///
/// Local models honor it through schema-constrained generation (blocking calls only).
#[derive(Debug, Clone, From, Serialize, Deserialize)]
pub enum ChatResponseFormat {
	/// Request to return a structured output following a JSON schema.
	#[from]
	JsonSpec(JsonSpec),
}

impl ChatResponseFormat {
	/// The JSON schema carried by this format.
	pub fn schema(&self) -> &Value {
		match self {
			Self::JsonSpec(spec) => &spec.schema,
		}
	}
}

/// The JSON specification for the structured output format.
#[derive(Debug, Clone, From, Serialize, Deserialize)]
pub struct JsonSpec {
	/// The name of the specification. Informative only for local models.
	pub name: String,
	/// The description of the JSON specification. Informative only for local models.
	pub description: Option<String>,

	/// The JSON schema the output must follow.
	/// Must be an `object` schema with non-empty typed `properties`.
	pub schema: Value,
}

/// Constructors
impl JsonSpec {
	/// Create a new `JsonSpec` from name and schema.
	pub fn new(name: impl Into<String>, schema: impl Into<Value>) -> Self {
		Self {
			name: name.into(),
			description: None,
			schema: schema.into(),
		}
	}
}

/// Setters
impl JsonSpec {
	/// Chainable setter to set the description in a `JsonSpec` construct.
	#[must_use]
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}
