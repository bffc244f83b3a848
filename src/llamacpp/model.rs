//! A loaded llama.cpp model and its generation loop.

use std::num::NonZeroU32;

use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::{AddBos, LlamaChatMessage, LlamaChatTemplate, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use serde_json::Value;
use tracing::debug;

use crate::engine::{GenerationConfig, LocalModel, StopFilter, StructuredOutput};
use crate::schema::schema_to_gbnf;
use crate::transform::PromptMessage;
use crate::{Error, Result};

const DEFAULT_SEED: u32 = 1234;
const MIN_BATCH_SIZE: usize = 512;

pub struct LlamaCppModel {
	model_id: String,
	backend: &'static LlamaBackend,
	model: LlamaModel,
	chat_template: Option<LlamaChatTemplate>,
}

impl LlamaCppModel {
	pub(super) fn new(model_id: impl Into<String>, backend: &'static LlamaBackend, model: LlamaModel) -> Self {
		let chat_template = model.chat_template(None).ok();
		Self {
			model_id: model_id.into(),
			backend,
			model,
			chat_template,
		}
	}

	/// Training context size of the model.
	pub fn n_ctx_train(&self) -> usize {
		self.model.n_ctx_train() as usize
	}
}

impl LocalModel for LlamaCppModel {
	fn model_id(&self) -> &str {
		&self.model_id
	}

	fn context_window(&self) -> Option<usize> {
		Some(self.n_ctx_train())
	}

	fn apply_chat_template(&self, messages: &[PromptMessage]) -> Result<Option<String>> {
		let Some(template) = &self.chat_template else {
			return Ok(None);
		};

		let llama_messages = messages
			.iter()
			.map(|m| LlamaChatMessage::new(m.role.clone(), m.content.clone()))
			.collect::<core::result::Result<Vec<_>, _>>()
			.map_err(|e| self.template_error(e))?;

		self.model
			.apply_chat_template(template, &llama_messages, true)
			.map(Some)
			.map_err(|e| self.template_error(e))
	}

	fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
		self.run(prompt, config, None, &mut |_| {})
	}

	fn generate_structured(&self, prompt: &str, schema: &Value, config: &GenerationConfig) -> Result<StructuredOutput> {
		let grammar = schema_to_gbnf(schema)?;
		let text = self.run(prompt, config, Some(&grammar), &mut |_| {})?;

		Ok(match serde_json::from_str::<Value>(text.trim()) {
			Ok(value) => StructuredOutput::Value(value),
			Err(_) => StructuredOutput::Text(text),
		})
	}

	fn generate_stream(&self, prompt: &str, config: &GenerationConfig, on_token: &mut dyn FnMut(&str)) -> Result<()> {
		self.run(prompt, config, None, on_token)?;
		Ok(())
	}
}

/// Generation loop
impl LlamaCppModel {
	fn run(
		&self,
		prompt: &str,
		config: &GenerationConfig,
		grammar: Option<&str>,
		on_token: &mut dyn FnMut(&str),
	) -> Result<String> {
		let tokens = self
			.model
			.str_to_token(prompt, AddBos::Always)
			.map_err(|e| Error::Engine(format!("Failed to tokenize prompt: {e}")))?;
		if tokens.is_empty() {
			return Ok(String::new());
		}

		let max_tokens = config.max_tokens as usize;
		let n_ctx = (tokens.len() + max_tokens).min(self.n_ctx_train().max(tokens.len() + 1));
		let context_params = LlamaContextParams::default().with_n_ctx(NonZeroU32::new(n_ctx as u32));
		let mut context = self
			.model
			.new_context(self.backend, context_params)
			.map_err(|e| Error::Engine(format!("Failed to create context: {e}")))?;

		let mut batch = LlamaBatch::new(tokens.len().max(MIN_BATCH_SIZE), 1);
		let last_index = (tokens.len() - 1) as i32;
		for (i, token) in (0_i32..).zip(tokens) {
			batch
				.add(token, i, &[0], i == last_index)
				.map_err(|e| Error::Engine(format!("Failed to add token to batch: {e}")))?;
		}
		decode(&mut context, &mut batch)?;

		let mut sampler = self.sampler(config, grammar)?;
		let mut decoder = encoding_rs::UTF_8.new_decoder();
		let mut stop_filter = StopFilter::new(&config.stop_sequences);
		let mut generated = String::new();
		let mut n_cur = batch.n_tokens();

		for _ in 0..max_tokens {
			let token = sampler.sample(&context, batch.n_tokens() - 1);
			sampler.accept(token);

			if self.model.is_eog_token(token) {
				break;
			}

			let bytes = self
				.model
				.token_to_bytes(token, Special::Tokenize)
				.map_err(|e| Error::Engine(format!("Failed to convert token to bytes: {e}")))?;
			let mut piece = String::with_capacity(32);
			let _ = decoder.decode_to_string(&bytes, &mut piece, false);

			let emitted = stop_filter.push(&piece);
			if !emitted.is_empty() {
				generated.push_str(&emitted);
				on_token(&emitted);
			}
			if stop_filter.is_stopped() {
				break;
			}

			batch.clear();
			batch
				.add(token, n_cur, &[0], true)
				.map_err(|e| Error::Engine(format!("Failed to add token to batch: {e}")))?;
			decode(&mut context, &mut batch)?;

			n_cur += 1;
			if n_cur as u32 >= context.n_ctx() {
				debug!(model_id = self.model_id, "context full, stopping generation");
				break;
			}
		}

		let held = stop_filter.finish();
		if !held.is_empty() {
			generated.push_str(&held);
			on_token(&held);
		}

		Ok(generated)
	}

	fn sampler(&self, config: &GenerationConfig, grammar: Option<&str>) -> Result<LlamaSampler> {
		let mut samplers = Vec::new();

		if let Some(grammar) = grammar {
			let grammar_sampler = LlamaSampler::grammar(&self.model, grammar, "root")
				.ok_or_else(|| Error::Engine("Failed to build grammar sampler from schema".to_string()))?;
			samplers.push(grammar_sampler);
		}

		samplers.push(LlamaSampler::temp(config.temperature as f32));
		if let Some(top_p) = config.top_p {
			samplers.push(LlamaSampler::top_p(top_p as f32, 1));
		}
		samplers.push(LlamaSampler::dist(config.seed.unwrap_or(DEFAULT_SEED)));

		Ok(LlamaSampler::chain(samplers, false))
	}

	fn template_error(&self, cause: impl std::fmt::Display) -> Error {
		Error::ChatTemplate {
			model_id: self.model_id.clone(),
			cause: cause.to_string(),
		}
	}
}

impl std::fmt::Debug for LlamaCppModel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LlamaCppModel")
			.field("model_id", &self.model_id)
			.field("has_chat_template", &self.chat_template.is_some())
			.finish()
	}
}

// region:    --- Support

fn decode(context: &mut LlamaContext<'_>, batch: &mut LlamaBatch) -> Result<()> {
	context
		.decode(batch)
		.map_err(|e| Error::Engine(format!("Failed to decode batch: {e}")))
}

// endregion: --- Support
