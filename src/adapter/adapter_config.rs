//! `AdapterConfig` holds the adapter level configuration, passed explicitly to the `LocalAdapter`.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::chat::ChatOptions;
use crate::instruction::InstructionTemplate;
use crate::{Error, Result};

// region:    --- StructuredFailurePolicy

/// What happens when schema-constrained generation fails.
///
/// Both policies log the failure first.
#[derive(Debug, Clone, Copy, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredFailurePolicy {
	/// Fail the request with `Error::StructuredGeneration`.
	#[default]
	#[display("fail")]
	Fail,
	/// Retry once with unconstrained generation and return whatever text comes back.
	#[display("fallback")]
	FallbackToText,
}

impl std::str::FromStr for StructuredFailurePolicy {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"fail" | "error" => Ok(Self::Fail),
			"fallback" | "fallback_to_text" | "text" => Ok(Self::FallbackToText),
			_ => Err(Error::Config {
				key: ENV_STRUCTURED_FAILURE.to_string(),
				value: s.to_string(),
				reason: "expected 'fail' or 'fallback'".to_string(),
			}),
		}
	}
}

// endregion: --- StructuredFailurePolicy

// region:    --- AdapterConfig

pub const ENV_INSTRUCTION_TEMPLATE: &str = "GENAI_LOCAL_INSTRUCTION_TEMPLATE";
pub const ENV_STRUCTURED_FAILURE: &str = "GENAI_LOCAL_STRUCTURED_FAILURE";
pub const ENV_RESERVED_TOKENS: &str = "GENAI_LOCAL_RESERVED_TOKENS";
pub const ENV_DEFAULT_CONTEXT_WINDOW: &str = "GENAI_LOCAL_DEFAULT_CONTEXT_WINDOW";

/// Tokens kept free for the response when checking the prompt length.
pub const DEFAULT_RESERVED_RESPONSE_TOKENS: usize = 512;

/// Context window assumed when the catalog does not know the model.
pub const DEFAULT_CONTEXT_WINDOW: usize = 4096;

/// The `LocalAdapter` configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
	instruction_template: InstructionTemplate,
	structured_failure_policy: StructuredFailurePolicy,
	reserved_response_tokens: usize,
	default_context_window: usize,
	chat_options: Option<ChatOptions>,
}

impl Default for AdapterConfig {
	fn default() -> Self {
		Self {
			instruction_template: InstructionTemplate::default(),
			structured_failure_policy: StructuredFailurePolicy::default(),
			reserved_response_tokens: DEFAULT_RESERVED_RESPONSE_TOKENS,
			default_context_window: DEFAULT_CONTEXT_WINDOW,
			chat_options: None,
		}
	}
}

/// Constructors
impl AdapterConfig {
	/// Build a config from the `GENAI_LOCAL_*` environment variables, defaults for the missing ones.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Same as `from_env`, with a custom variable lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let mut config = Self::default();

		if let Some(template) = lookup(ENV_INSTRUCTION_TEMPLATE) {
			config.instruction_template.set(Some(template));
		}
		if let Some(policy) = lookup(ENV_STRUCTURED_FAILURE) {
			config.structured_failure_policy = policy.parse()?;
		}
		if let Some(value) = lookup(ENV_RESERVED_TOKENS) {
			config.reserved_response_tokens = parse_usize(ENV_RESERVED_TOKENS, &value)?;
		}
		if let Some(value) = lookup(ENV_DEFAULT_CONTEXT_WINDOW) {
			config.default_context_window = parse_usize(ENV_DEFAULT_CONTEXT_WINDOW, &value)?;
		}

		Ok(config)
	}
}

/// Chainable setters
impl AdapterConfig {
	#[must_use]
	pub fn with_instruction_template(mut self, template: impl Into<String>) -> Self {
		self.instruction_template.set(Some(template.into()));
		self
	}

	#[must_use]
	pub const fn with_structured_failure_policy(mut self, policy: StructuredFailurePolicy) -> Self {
		self.structured_failure_policy = policy;
		self
	}

	#[must_use]
	pub const fn with_reserved_response_tokens(mut self, tokens: usize) -> Self {
		self.reserved_response_tokens = tokens;
		self
	}

	#[must_use]
	pub const fn with_default_context_window(mut self, tokens: usize) -> Self {
		self.default_context_window = tokens;
		self
	}

	/// Default chat options, used when a request does not set a value.
	#[must_use]
	pub fn with_chat_options(mut self, options: ChatOptions) -> Self {
		self.chat_options = Some(options);
		self
	}
}

/// Getters
impl AdapterConfig {
	pub fn instruction_template(&self) -> &InstructionTemplate {
		&self.instruction_template
	}

	pub fn instruction_template_mut(&mut self) -> &mut InstructionTemplate {
		&mut self.instruction_template
	}

	pub fn structured_failure_policy(&self) -> StructuredFailurePolicy {
		self.structured_failure_policy
	}

	pub fn reserved_response_tokens(&self) -> usize {
		self.reserved_response_tokens
	}

	pub fn default_context_window(&self) -> usize {
		self.default_context_window
	}

	pub fn chat_options(&self) -> Option<&ChatOptions> {
		self.chat_options.as_ref()
	}
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
	value.trim().parse::<usize>().map_err(|err| Error::Config {
		key: key.to_string(),
		value: value.to_string(),
		reason: err.to_string(),
	})
}

// endregion: --- AdapterConfig

// region:    --- Tests

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_from_lookup_defaults() -> Result<()> {
		let config = AdapterConfig::from_lookup(|_| None)?;
		assert_eq!(config.structured_failure_policy(), StructuredFailurePolicy::Fail);
		assert_eq!(config.reserved_response_tokens(), DEFAULT_RESERVED_RESPONSE_TOKENS);
		assert_eq!(config.default_context_window(), DEFAULT_CONTEXT_WINDOW);
		assert!(!config.instruction_template().is_custom());
		Ok(())
	}

	#[test]
	fn test_from_lookup_values() -> Result<()> {
		let vars: HashMap<&str, &str> = HashMap::from([
			(ENV_INSTRUCTION_TEMPLATE, "JSON please: {schema_description}"),
			(ENV_STRUCTURED_FAILURE, "fallback"),
			(ENV_RESERVED_TOKENS, "256"),
			(ENV_DEFAULT_CONTEXT_WINDOW, "8192"),
		]);
		let config = AdapterConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;

		assert_eq!(config.instruction_template().render("a (string)"), "JSON please: a (string)");
		assert_eq!(config.structured_failure_policy(), StructuredFailurePolicy::FallbackToText);
		assert_eq!(config.reserved_response_tokens(), 256);
		assert_eq!(config.default_context_window(), 8192);
		Ok(())
	}

	#[test]
	fn test_from_lookup_bad_value() {
		let res = AdapterConfig::from_lookup(|key| (key == ENV_RESERVED_TOKENS).then(|| "lots".to_string()));
		assert!(matches!(res, Err(Error::Config { key, .. }) if key == ENV_RESERVED_TOKENS));
	}
}

// endregion: --- Tests
