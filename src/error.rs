use derive_more::{Display, From};

/// GenAI-local main Result type alias (with genai_local::Error)
pub type Result<T> = core::result::Result<T, Error>;

/// Main genai-local error type.
///
/// Every variant renders a complete, human-readable message. Callers who do not care about the
/// kind can simply display it.
#[derive(Debug, From, Display)]
#[allow(missing_docs)]
pub enum Error {
	// region:    --- Request Input
	#[display("{report}")]
	SchemaInvalid { errors: Vec<String>, report: String },

	#[display(
		"Tool calling is not supported by local models (model '{model_id}', {tool_count} tool(s) attached). Remove the tools from the request."
	)]
	ToolsUnsupported { model_id: String, tool_count: usize },

	#[display(
		"Prompt is too long: estimated {estimated_tokens} tokens, but model '{model_id}' has a context window of {context_window} tokens ({reserved} reserved for the response)."
	)]
	ContextLengthExceeded {
		estimated_tokens: usize,
		model_id: String,
		context_window: usize,
		reserved: usize,
	},
	// endregion: --- Request Input

	// region:    --- Model Loading
	#[display(
		"Failed to load the tokenizer for model '{model_id}'. Make sure the model ships a tokenizer or that the tokenizer id is correct. Original error: {cause}"
	)]
	TokenizerNotFound { model_id: String, cause: String },

	#[display(
		"Failed to find the model weights for '{model_id}'. Check the model id/path and that the file was downloaded. Original error: {cause}"
	)]
	ModelNotFound { model_id: String, cause: String },

	#[display("Failed to load model '{model_id}': {cause}")]
	ModelLoadFailed { model_id: String, cause: String },
	// endregion: --- Model Loading

	// region:    --- Generation
	#[display("Structured generation failed for model '{model_id}': {cause}")]
	StructuredGeneration { model_id: String, cause: String },

	#[display("Failed to apply chat template for model '{model_id}': {cause}")]
	ChatTemplate { model_id: String, cause: String },

	#[display("Engine error: {_0}")]
	Engine(String),
	// endregion: --- Generation

	// region:    --- Config
	#[display("Invalid configuration value for '{key}': '{value}' ({reason})")]
	Config { key: String, value: String, reason: String },
	// endregion: --- Config

	#[display("Internal error: {_0}")]
	Internal(String),

	// region:    --- Externals
	#[from]
	#[display("JSON error: {_0}")]
	SerdeJson(serde_json::Error),
	// endregion: --- Externals
}

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
