//! The `LocalAdapter`, which runs chat completions against a local model.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::adapter::support::{backtrace_excerpt, missing_required_fields, recover_json};
use crate::adapter::{AdapterConfig, StructuredFailurePolicy, check_context_length, estimate_tokens};
use crate::chat::{ChatOptions, ChatOptionsSet, ChatRequest, ChatResponse, ChatRole, StreamChunk, Usage};
use crate::engine::{GenerationConfig, LocalModel, ModelCatalog, ModelLoader, ModelManager, StaticCatalog, StructuredOutput};
use crate::schema::Schema;
use crate::transform::{PromptMessage, inject_json_instructions, normalize_request, plain_prompt};
use crate::{Error, Result};

// region:    --- GenerationRequest

/// Everything one generation call needs, resolved from the request, its options and the
/// adapter config. Built fresh for every call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
	pub model_id: String,
	/// Normalized turns (without JSON instructions).
	pub messages: Vec<PromptMessage>,
	pub stream: bool,
	/// Normalized and validated schema, for structured (non-stream) requests.
	pub schema: Option<Schema>,
	pub instruction_template: String,
	pub failure_policy: StructuredFailurePolicy,
	pub config: GenerationConfig,
}

// endregion: --- GenerationRequest

// region:    --- LocalAdapter

/// Chat completion adapter for local models.
///
/// Holds the model cache, the model catalog and the adapter config. All methods but
/// `exec_chat_async` run on the calling thread.
pub struct LocalAdapter {
	models: ModelManager,
	catalog: Arc<dyn ModelCatalog>,
	config: AdapterConfig,
}

/// Constructors
impl LocalAdapter {
	pub fn new(loader: impl ModelLoader + 'static) -> Self {
		Self::from_loader(Arc::new(loader))
	}

	pub fn from_loader(loader: Arc<dyn ModelLoader>) -> Self {
		Self {
			models: ModelManager::new(loader),
			catalog: Arc::new(StaticCatalog::new()),
			config: AdapterConfig::default(),
		}
	}

	#[must_use]
	pub fn with_catalog(mut self, catalog: impl ModelCatalog + 'static) -> Self {
		self.catalog = Arc::new(catalog);
		self
	}

	#[must_use]
	pub fn with_config(mut self, config: AdapterConfig) -> Self {
		self.config = config;
		self
	}
}

/// Getters
impl LocalAdapter {
	pub fn config(&self) -> &AdapterConfig {
		&self.config
	}

	pub fn config_mut(&mut self) -> &mut AdapterConfig {
		&mut self.config
	}

	pub fn models(&self) -> &ModelManager {
		&self.models
	}

	/// Context window of `model`: the catalog entry first, then what the model reports,
	/// then the configured default.
	pub fn context_window(&self, model: &dyn LocalModel) -> usize {
		self.catalog
			.context_window(model.model_id())
			.or_else(|| model.context_window())
			.unwrap_or_else(|| self.config.default_context_window())
	}
}

/// Chat execution
impl LocalAdapter {
	/// Execute a blocking chat completion.
	///
	/// With a `response_format` in the options, runs schema-constrained generation and returns
	/// the canonical JSON text as content (and the value in `ChatResponse::structured`).
	pub fn exec_chat(&self, model_id: &str, chat_req: ChatRequest, options: Option<&ChatOptions>) -> Result<ChatResponse> {
		ensure_no_tools(model_id, &chat_req)?;
		let model = self.models.load_model(model_id)?;
		let gen_req = self.to_generation_request(model_id, &chat_req, options, false)?;

		let (content, structured) = match &gen_req.schema {
			None => {
				let prompt = self.render_prompt(model.as_ref(), &gen_req.messages)?;
				debug!(model_id, prompt_bytes = prompt.len(), temperature = gen_req.config.temperature, "plain generation");
				(model.generate(&prompt, &gen_req.config)?, None)
			}
			Some(schema) => {
				let messages = inject_json_instructions(&gen_req.messages, schema, &gen_req.instruction_template);
				let prompt = self.render_prompt(model.as_ref(), &messages)?;
				debug!(model_id, prompt_bytes = prompt.len(), temperature = gen_req.config.temperature, "structured generation");
				self.generate_structured(model.as_ref(), &prompt, schema, &gen_req)?
			}
		};

		Ok(build_response(model_id, &gen_req.messages, content, structured))
	}

	/// Execute a streaming chat completion.
	///
	/// `on_chunk` is called synchronously for every generated token, in order, then exactly
	/// once more with an empty-content chunk marking the end of the stream. Streaming is
	/// always unconstrained; a `response_format` is ignored.
	///
	/// When generation fails midway, the error is returned and no end chunk is sent.
	pub fn exec_chat_stream(
		&self,
		model_id: &str,
		chat_req: ChatRequest,
		options: Option<&ChatOptions>,
		mut on_chunk: impl FnMut(&StreamChunk),
	) -> Result<ChatResponse> {
		ensure_no_tools(model_id, &chat_req)?;
		let model = self.models.load_model(model_id)?;
		let gen_req = self.to_generation_request(model_id, &chat_req, options, true)?;

		let prompt = self.render_prompt(model.as_ref(), &gen_req.messages)?;
		debug!(model_id, prompt_bytes = prompt.len(), temperature = gen_req.config.temperature, "stream generation");

		let mut full_text = String::new();
		let mut on_token = |token: &str| {
			// an empty chunk is the end marker
			if token.is_empty() {
				return;
			}
			full_text.push_str(token);
			on_chunk(&StreamChunk::token(token));
		};
		model.generate_stream(&prompt, &gen_req.config, &mut on_token)?;
		on_chunk(&StreamChunk::end());

		Ok(build_response(model_id, &gen_req.messages, full_text, None))
	}

	/// Run `exec_chat` on the tokio blocking pool, for async hosts.
	pub async fn exec_chat_async(
		self: Arc<Self>,
		model_id: impl Into<String>,
		chat_req: ChatRequest,
		options: Option<ChatOptions>,
	) -> Result<ChatResponse> {
		let model_id = model_id.into();
		tokio::task::spawn_blocking(move || self.exec_chat(&model_id, chat_req, options.as_ref()))
			.await
			.map_err(|e| Error::Internal(format!("Generation task failed: {e}")))?
	}

	/// Resolve the request and options into a `GenerationRequest`.
	///
	/// For non-stream requests with a `response_format`, the schema is normalized and
	/// validated here; an invalid schema fails the whole request.
	pub fn to_generation_request(
		&self,
		model_id: &str,
		chat_req: &ChatRequest,
		options: Option<&ChatOptions>,
		stream: bool,
	) -> Result<GenerationRequest> {
		let options_set = ChatOptionsSet::default()
			.with_client_options(self.config.chat_options())
			.with_chat_options(options);

		let schema = match (options_set.response_format(), stream) {
			(None, _) => None,
			(Some(_), true) => {
				debug!(model_id, "response_format ignored in stream mode");
				None
			}
			(Some(format), false) => {
				let received = format.schema();
				let schema = Schema::normalize(received.clone());
				schema.validate_received(received)?;
				Some(schema)
			}
		};

		let (default_temperature, default_max_tokens) = if schema.is_some() {
			(GenerationConfig::STRUCTURED_TEMPERATURE, GenerationConfig::STRUCTURED_MAX_TOKENS)
		} else {
			(GenerationConfig::PLAIN_TEMPERATURE, GenerationConfig::PLAIN_MAX_TOKENS)
		};

		let config = GenerationConfig {
			temperature: options_set.temperature().unwrap_or(default_temperature),
			max_tokens: options_set.max_tokens().unwrap_or(default_max_tokens),
			top_p: options_set.top_p(),
			seed: options_set.seed(),
			stop_sequences: options_set.stop_sequences().to_vec(),
			extra: options_set.extra().cloned(),
		};

		let instruction_template = options_set
			.instruction_template()
			.unwrap_or_else(|| self.config.instruction_template().get())
			.to_string();

		Ok(GenerationRequest {
			model_id: model_id.to_string(),
			messages: normalize_request(chat_req),
			stream,
			schema,
			instruction_template,
			failure_policy: options_set
				.structured_failure_policy()
				.unwrap_or_else(|| self.config.structured_failure_policy()),
			config,
		})
	}
}

/// Private support
impl LocalAdapter {
	/// Render with the model chat template when it has one, the plain format otherwise,
	/// then check the result against the model context window.
	fn render_prompt(&self, model: &dyn LocalModel, messages: &[PromptMessage]) -> Result<String> {
		let prompt = match model.apply_chat_template(messages)? {
			Some(prompt) => prompt,
			None => plain_prompt(messages),
		};

		let model_id = model.model_id();
		check_context_length(
			&prompt,
			model_id,
			self.context_window(model),
			self.config.reserved_response_tokens(),
		)?;

		Ok(prompt)
	}

	fn generate_structured(
		&self,
		model: &dyn LocalModel,
		prompt: &str,
		schema: &Schema,
		gen_req: &GenerationRequest,
	) -> Result<(String, Option<Value>)> {
		let model_id = gen_req.model_id.as_str();

		match model.generate_structured(prompt, schema.as_value(), &gen_req.config) {
			Ok(StructuredOutput::Value(Value::String(text))) => Ok((text, None)),
			Ok(StructuredOutput::Value(value)) => structured_content(schema, value),
			Ok(StructuredOutput::Text(raw)) => match recover_json(&raw)? {
				Some(value) => structured_content(schema, value),
				None => {
					warn!(model_id, "structured output is not JSON, returning raw text");
					Ok((raw, None))
				}
			},
			Err(err) => {
				error!(
					model_id,
					error = %err,
					error_kind = ?err,
					backtrace = %backtrace_excerpt(),
					"structured generation failed"
				);
				match gen_req.failure_policy {
					StructuredFailurePolicy::Fail => Err(Error::StructuredGeneration {
						model_id: model_id.to_string(),
						cause: err.to_string(),
					}),
					StructuredFailurePolicy::FallbackToText => {
						warn!(model_id, "falling back to unconstrained generation");
						Ok((model.generate(prompt, &gen_req.config)?, None))
					}
				}
			}
		}
	}
}

impl std::fmt::Debug for LocalAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalAdapter")
			.field("models", &self.models)
			.field("config", &self.config)
			.finish()
	}
}

// endregion: --- LocalAdapter

// region:    --- Support

fn ensure_no_tools(model_id: &str, chat_req: &ChatRequest) -> Result<()> {
	let tool_count = chat_req.tool_count();
	if tool_count > 0 {
		return Err(Error::ToolsUnsupported {
			model_id: model_id.to_string(),
			tool_count,
		});
	}
	Ok(())
}

fn structured_content(schema: &Schema, value: Value) -> Result<(String, Option<Value>)> {
	let missing = missing_required_fields(&schema.required_fields(), &value);
	if !missing.is_empty() {
		warn!(?missing, "structured output is missing required fields");
	}
	let content = serde_json::to_string(&value)?;
	Ok((content, Some(value)))
}

fn build_response(model_id: &str, messages: &[PromptMessage], content: String, structured: Option<Value>) -> ChatResponse {
	let prompt_text: String = messages.iter().map(|m| m.content.as_str()).collect();
	let usage = Usage::from_estimates(estimate_tokens(&prompt_text), estimate_tokens(&content));

	ChatResponse {
		role: ChatRole::Assistant,
		content,
		structured,
		model_id: model_id.to_string(),
		usage,
	}
}

// endregion: --- Support
