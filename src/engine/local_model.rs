use std::sync::Arc;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::transform::PromptMessage;

// region:    --- GenerationConfig

/// Resolved generation parameters handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
	pub temperature: f64,
	pub max_tokens: u32,
	pub top_p: Option<f64>,
	pub seed: Option<u32>,
	pub stop_sequences: Vec<String>,
	/// Free-form engine parameters from `ChatOptions::extra`.
	pub extra: Option<Value>,
}

impl GenerationConfig {
	/// Defaults for plain (unconstrained) generation.
	pub const PLAIN_TEMPERATURE: f64 = 0.7;
	pub const PLAIN_MAX_TOKENS: u32 = 512;

	/// Defaults for schema-constrained generation.
	pub const STRUCTURED_TEMPERATURE: f64 = 0.3;
	pub const STRUCTURED_MAX_TOKENS: u32 = 1024;

	pub fn new(temperature: f64, max_tokens: u32) -> Self {
		Self {
			temperature,
			max_tokens,
			top_p: None,
			seed: None,
			stop_sequences: Vec::new(),
			extra: None,
		}
	}
}

// endregion: --- GenerationConfig

// region:    --- StructuredOutput

/// What a schema-constrained generation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructuredOutput {
	/// The output parsed as JSON.
	Value(Value),
	/// The raw output, when the engine could not parse it.
	Text(String),
}

// endregion: --- StructuredOutput

// region:    --- LocalModel

/// A loaded local model.
///
/// All calls are blocking. `generate_stream` must call `on_token` synchronously, in order,
/// on the calling thread; a slow callback throttles generation.
pub trait LocalModel: Send + Sync {
	fn model_id(&self) -> &str;

	/// The context window (input + response tokens) the engine runs this model with, if known.
	fn context_window(&self) -> Option<usize> {
		None
	}

	/// Render the turns with the model chat template.
	/// `Ok(None)` when the model has no chat template (the adapter then uses a plain prompt).
	fn apply_chat_template(&self, messages: &[PromptMessage]) -> Result<Option<String>> {
		let _ = messages;
		Ok(None)
	}

	fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

	/// Generate with decoding constrained by `schema` (normalized JSON schema).
	fn generate_structured(&self, prompt: &str, schema: &Value, config: &GenerationConfig) -> Result<StructuredOutput>;

	fn generate_stream(&self, prompt: &str, config: &GenerationConfig, on_token: &mut dyn FnMut(&str)) -> Result<()>;
}

// endregion: --- LocalModel

// region:    --- ModelLoader

/// Raw error of a model loader, classified by the `ModelManager`.
#[derive(Debug, Clone, Display, From, PartialEq, Eq)]
#[display("{message}")]
pub struct LoadError {
	pub message: String,
}

impl From<&str> for LoadError {
	fn from(message: &str) -> Self {
		Self {
			message: message.to_string(),
		}
	}
}

impl std::error::Error for LoadError {}

/// Loads models by id (name, path, or repository id, depending on the engine).
pub trait ModelLoader: Send + Sync {
	fn load(&self, model_id: &str) -> core::result::Result<Arc<dyn LocalModel>, LoadError>;
}

// endregion: --- ModelLoader
