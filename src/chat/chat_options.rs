//! `ChatOptions` allows customization of a chat request.
//! - It can be provided at the `LocalAdapter::exec_chat(..)` level as an argument,
//! - or set in the adapter config `AdapterConfig::with_chat_options(..)` to be used as the default for all requests
//!
//! Note: Keeping it out of the `ChatRequest` object allows for better reusability of each component.

use crate::StructuredFailurePolicy;
use crate::chat::chat_req_response_format::{ChatResponseFormat, JsonSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat Options that are considered for any `LocalAdapter::exec...` calls.
///
/// A fallback `ChatOptions` can also be set in the `AdapterConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
	/// Sampling temperature.
	/// When absent: 0.7 for plain generation, 0.3 for structured generation.
	pub temperature: Option<f64>,

	/// Maximum number of generated tokens.
	/// When absent: 512 for plain generation, 1024 for structured generation.
	pub max_tokens: Option<u32>,

	/// Nucleus sampling, if the engine supports it.
	pub top_p: Option<f64>,

	/// Sampling seed, if the engine supports it.
	pub seed: Option<u32>,

	/// Specifies sequences used as end markers when generating text
	pub stop_sequences: Vec<String>,

	/// Request a structured output (blocking calls only).
	pub response_format: Option<ChatResponseFormat>,

	/// Override of the JSON instruction template for this request.
	/// Must contain `{schema_description}` to mention the schema fields.
	pub instruction_template: Option<String>,

	/// Override of what happens when structured generation fails.
	pub structured_failure_policy: Option<StructuredFailurePolicy>,

	/// Free-form engine parameters, forwarded as is to the engine.
	pub extra: Option<Value>,
}

/// Chainable Setters
impl ChatOptions {
	/// Set the `temperature` for this request.
	#[must_use]
	pub const fn with_temperature(mut self, value: f64) -> Self {
		self.temperature = Some(value);
		self
	}

	/// Set the `max_tokens` for this request.
	#[must_use]
	pub const fn with_max_tokens(mut self, value: u32) -> Self {
		self.max_tokens = Some(value);
		self
	}

	/// Set the `top_p` for this request.
	#[must_use]
	pub const fn with_top_p(mut self, value: f64) -> Self {
		self.top_p = Some(value);
		self
	}

	#[must_use]
	pub const fn with_seed(mut self, value: u32) -> Self {
		self.seed = Some(value);
		self
	}

	#[must_use]
	pub fn with_stop_sequences(mut self, values: Vec<String>) -> Self {
		self.stop_sequences = values;
		self
	}

	/// Set the `response_format` for this request.
	#[must_use]
	pub fn with_response_format(mut self, res_format: impl Into<ChatResponseFormat>) -> Self {
		self.response_format = Some(res_format.into());
		self
	}

	/// Shortcut for `with_response_format(JsonSpec::new("response", schema))`.
	#[must_use]
	pub fn with_json_schema(self, schema: impl Into<Value>) -> Self {
		self.with_response_format(JsonSpec::new("response", schema))
	}

	#[must_use]
	pub fn with_instruction_template(mut self, template: impl Into<String>) -> Self {
		self.instruction_template = Some(template.into());
		self
	}

	#[must_use]
	pub const fn with_structured_failure_policy(mut self, policy: StructuredFailurePolicy) -> Self {
		self.structured_failure_policy = Some(policy);
		self
	}

	#[must_use]
	pub fn with_extra(mut self, extra: Value) -> Self {
		self.extra = Some(extra);
		self
	}
}

// region:    --- ChatOptionsSet

/// This is an internal crate struct to resolve the `ChatOptions` value in a cascading manner.
///
/// First, it attempts to get the value at the chat level (`ChatOptions` from the `exec_chat`...(...) argument).
/// If a value for the property is not found, it looks at the adapter default one.
#[derive(Default, Clone, Debug)]
pub struct ChatOptionsSet<'a, 'b> {
	client: Option<&'a ChatOptions>,
	chat: Option<&'b ChatOptions>,
}

impl<'a, 'b> ChatOptionsSet<'a, 'b> {
	#[must_use]
	pub const fn with_client_options(mut self, options: Option<&'a ChatOptions>) -> Self {
		self.client = options;
		self
	}
	#[must_use]
	pub const fn with_chat_options(mut self, options: Option<&'b ChatOptions>) -> Self {
		self.chat = options;
		self
	}
}

impl ChatOptionsSet<'_, '_> {
	#[must_use]
	pub fn temperature(&self) -> Option<f64> {
		self.chat
			.and_then(|chat| chat.temperature)
			.or_else(|| self.client.and_then(|client| client.temperature))
	}

	#[must_use]
	pub fn max_tokens(&self) -> Option<u32> {
		self.chat
			.and_then(|chat| chat.max_tokens)
			.or_else(|| self.client.and_then(|client| client.max_tokens))
	}

	#[must_use]
	pub fn top_p(&self) -> Option<f64> {
		self.chat
			.and_then(|chat| chat.top_p)
			.or_else(|| self.client.and_then(|client| client.top_p))
	}

	#[must_use]
	pub fn seed(&self) -> Option<u32> {
		self.chat
			.and_then(|chat| chat.seed)
			.or_else(|| self.client.and_then(|client| client.seed))
	}

	#[must_use]
	pub fn stop_sequences(&self) -> &[String] {
		self.chat
			.map(|chat| &*chat.stop_sequences)
			.filter(|stops| !stops.is_empty())
			.or_else(|| self.client.map(|client| &*client.stop_sequences))
			.unwrap_or(&[])
	}

	#[must_use]
	pub fn response_format(&self) -> Option<&ChatResponseFormat> {
		self.chat
			.and_then(|chat| chat.response_format.as_ref())
			.or_else(|| self.client.and_then(|client| client.response_format.as_ref()))
	}

	#[must_use]
	pub fn instruction_template(&self) -> Option<&str> {
		self.chat
			.and_then(|chat| chat.instruction_template.as_deref())
			.or_else(|| self.client.and_then(|client| client.instruction_template.as_deref()))
	}

	#[must_use]
	pub fn structured_failure_policy(&self) -> Option<StructuredFailurePolicy> {
		self.chat
			.and_then(|chat| chat.structured_failure_policy)
			.or_else(|| self.client.and_then(|client| client.structured_failure_policy))
	}

	#[must_use]
	pub fn extra(&self) -> Option<&Value> {
		self.chat
			.and_then(|chat| chat.extra.as_ref())
			.or_else(|| self.client.and_then(|client| client.extra.as_ref()))
	}
}

// endregion: --- ChatOptionsSet

// region:    --- Tests


// endregion: --- Tests
