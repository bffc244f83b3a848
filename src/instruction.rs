//! JSON generation instructions appended to the last user turn of a structured request.
//!
//! The template is configuration owned by whoever owns the `LocalAdapter` (see
//! `AdapterConfig::with_instruction_template`), and can be overridden per request through
//! `ChatOptions::with_instruction_template`. It is not process-wide state.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the schema description.
pub const SCHEMA_DESCRIPTION_PLACEHOLDER: &str = "{schema_description}";

/// Built-in instruction template.
pub const DEFAULT_INSTRUCTION_TEMPLATE: &str = "\n\nRespond with ONLY a valid JSON object containing: {schema_description}. Do not include any text outside the JSON object.";

/// The instruction template, with an optional custom override of the built-in one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionTemplate {
	custom: Option<String>,
}

/// Constructors
impl InstructionTemplate {
	pub fn new(template: impl Into<String>) -> Self {
		Self {
			custom: Some(template.into()),
		}
	}
}

impl InstructionTemplate {
	/// The active template: the custom one if set, the built-in default otherwise.
	pub fn get(&self) -> &str {
		self.custom.as_deref().unwrap_or(DEFAULT_INSTRUCTION_TEMPLATE)
	}

	/// Replace the active template. `None` reverts to the built-in default.
	pub fn set(&mut self, template: Option<String>) {
		self.custom = template;
	}

	/// Clear the custom template.
	pub fn reset(&mut self) {
		self.custom = None;
	}

	pub fn is_custom(&self) -> bool {
		self.custom.is_some()
	}

	/// Substitute every occurrence of the placeholder with `description`.
	/// A template without the placeholder is returned unchanged.
	pub fn render(&self, description: &str) -> String {
		render_template(self.get(), description)
	}
}

pub(crate) fn render_template(template: &str, description: &str) -> String {
	template.replace(SCHEMA_DESCRIPTION_PLACEHOLDER, description)
}

// region:    --- Tests


// endregion: --- Tests
