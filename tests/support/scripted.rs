//! A scripted in-memory engine, recording what the adapter hands to it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use genai_local::engine::{GenerationConfig, LoadError, LocalModel, ModelLoader, StructuredOutput};
use genai_local::transform::PromptMessage;
use genai_local::{Error, Result};
use serde_json::Value;

// region:    --- ScriptedModel

/// What `generate_structured` answers.
#[derive(Debug, Clone)]
pub enum ScriptedStructured {
	Value(Value),
	Text(String),
	Fail(String),
}

/// How `apply_chat_template` renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedTemplate {
	/// No chat template (plain prompt fallback).
	None,
	/// `<|role|>content` per turn, then `<|assistant|>`.
	Tagged,
	/// The turn contents concatenated, nothing else.
	Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedCall {
	pub method: &'static str,
	pub prompt: String,
	pub config: GenerationConfig,
	pub schema: Option<Value>,
}

#[derive(Debug)]
pub struct ScriptedModel {
	model_id: String,
	template: ScriptedTemplate,
	text: String,
	structured: ScriptedStructured,
	tokens: Vec<String>,
	context_window: Option<usize>,
	calls: Mutex<Vec<ScriptedCall>>,
}

/// Constructors & Setters
impl ScriptedModel {
	pub fn new(model_id: impl Into<String>) -> Self {
		Self {
			model_id: model_id.into(),
			template: ScriptedTemplate::None,
			text: "Hello from the local model.".to_string(),
			structured: ScriptedStructured::Fail("no structured output scripted".to_string()),
			tokens: Vec::new(),
			context_window: None,
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn with_template(mut self, template: ScriptedTemplate) -> Self {
		self.template = template;
		self
	}

	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = text.into();
		self
	}

	pub fn with_structured(mut self, structured: ScriptedStructured) -> Self {
		self.structured = structured;
		self
	}

	pub fn with_tokens(mut self, tokens: &[&str]) -> Self {
		self.tokens = tokens.iter().map(|t| t.to_string()).collect();
		self
	}

	/// The context window the model reports for itself.
	pub fn with_context_window(mut self, context_window: usize) -> Self {
		self.context_window = Some(context_window);
		self
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}
}

/// Recorded calls
impl ScriptedModel {
	pub fn calls(&self) -> Vec<ScriptedCall> {
		self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
	}

	pub fn last_call(&self) -> Option<ScriptedCall> {
		self.calls().pop()
	}

	pub fn methods(&self) -> Vec<&'static str> {
		self.calls().into_iter().map(|call| call.method).collect()
	}

	fn record(&self, method: &'static str, prompt: &str, config: &GenerationConfig, schema: Option<&Value>) {
		if let Ok(mut calls) = self.calls.lock() {
			calls.push(ScriptedCall {
				method,
				prompt: prompt.to_string(),
				config: config.clone(),
				schema: schema.cloned(),
			});
		}
	}
}

impl LocalModel for ScriptedModel {
	fn model_id(&self) -> &str {
		&self.model_id
	}

	fn context_window(&self) -> Option<usize> {
		self.context_window
	}

	fn apply_chat_template(&self, messages: &[PromptMessage]) -> Result<Option<String>> {
		let prompt = match self.template {
			ScriptedTemplate::None => return Ok(None),
			ScriptedTemplate::Tagged => {
				let mut prompt: String = messages.iter().map(|m| format!("<|{}|>{}", m.role, m.content)).collect();
				prompt.push_str("<|assistant|>");
				prompt
			}
			ScriptedTemplate::Raw => messages.iter().map(|m| m.content.as_str()).collect(),
		};
		Ok(Some(prompt))
	}

	fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
		self.record("generate", prompt, config, None);
		Ok(self.text.clone())
	}

	fn generate_structured(&self, prompt: &str, schema: &Value, config: &GenerationConfig) -> Result<StructuredOutput> {
		self.record("generate_structured", prompt, config, Some(schema));
		match &self.structured {
			ScriptedStructured::Value(value) => Ok(StructuredOutput::Value(value.clone())),
			ScriptedStructured::Text(text) => Ok(StructuredOutput::Text(text.clone())),
			ScriptedStructured::Fail(cause) => Err(Error::Engine(cause.clone())),
		}
	}

	fn generate_stream(&self, prompt: &str, config: &GenerationConfig, on_token: &mut dyn FnMut(&str)) -> Result<()> {
		self.record("generate_stream", prompt, config, None);
		for token in &self.tokens {
			on_token(token);
		}
		Ok(())
	}
}

// endregion: --- ScriptedModel

// region:    --- ScriptedLoader

#[derive(Debug, Default)]
pub struct ScriptedLoader {
	models: HashMap<String, Arc<ScriptedModel>>,
	failures: HashMap<String, String>,
	loads: AtomicUsize,
}

impl ScriptedLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_model(mut self, model: Arc<ScriptedModel>) -> Self {
		self.models.insert(model.model_id().to_string(), model);
		self
	}

	/// Loading `model_id` fails with `message`.
	pub fn with_failure(mut self, model_id: impl Into<String>, message: impl Into<String>) -> Self {
		self.failures.insert(model_id.into(), message.into());
		self
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}

	/// Number of `load` calls that reached this loader.
	pub fn load_count(&self) -> usize {
		self.loads.load(Ordering::SeqCst)
	}
}

impl ModelLoader for ScriptedLoader {
	fn load(&self, model_id: &str) -> core::result::Result<Arc<dyn LocalModel>, LoadError> {
		self.loads.fetch_add(1, Ordering::SeqCst);

		if let Some(message) = self.failures.get(model_id) {
			return Err(LoadError::from(message.as_str()));
		}
		match self.models.get(model_id) {
			Some(model) => Ok(model.clone()),
			None => Err(LoadError::from(format!("model file not found: {model_id}"))),
		}
	}
}

// endregion: --- ScriptedLoader
