//! This module contains the `ChatRequest` type.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, Tool};

// region:    --- ChatRequest

/// The chat request handed to `LocalAdapter::exec_chat` / `exec_chat_stream`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
	/// The initial system content of the request. Prepended as a system turn.
	pub system: Option<String>,

	/// The messages of the request.
	pub messages: Vec<ChatMessage>,

	/// Tools are not supported by local models. A request carrying any is rejected.
	pub tools: Option<Vec<Tool>>,
}

/// Constructors
impl ChatRequest {
	/// Create a new ChatRequest with the given messages.
	pub fn new(messages: Vec<ChatMessage>) -> Self {
		Self {
			messages,
			system: None,
			tools: None,
		}
	}

	/// Create a ChatRequest with one system message.
	pub fn from_system(content: impl Into<String>) -> Self {
		Self {
			system: Some(content.into()),
			messages: Vec::new(),
			tools: None,
		}
	}

	/// Create a ChatRequest with one user message.
	pub fn from_user(content: impl Into<String>) -> Self {
		Self {
			system: None,
			messages: vec![ChatMessage::user(content.into())],
			tools: None,
		}
	}
}

/// Chainable Setters
impl ChatRequest {
	/// Set the system content of the request.
	#[must_use]
	pub fn with_system(mut self, system: impl Into<String>) -> Self {
		self.system = Some(system.into());
		self
	}

	/// Append a message to the request.
	#[must_use]
	pub fn append_message(mut self, msg: impl Into<ChatMessage>) -> Self {
		self.messages.push(msg.into());
		self
	}

	#[must_use]
	pub fn with_tools<I>(mut self, tools: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Tool>,
	{
		self.tools = Some(tools.into_iter().map(Into::into).collect());
		self
	}
}

/// Getters
impl ChatRequest {
	/// Number of tool specifications attached to this request.
	pub fn tool_count(&self) -> usize {
		self.tools.as_ref().map(Vec::len).unwrap_or(0)
	}
}

// endregion: --- ChatRequest
