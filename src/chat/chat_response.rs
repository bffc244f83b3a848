//! This module contains all the types related to a Chat Response (except StreamChunk, which has its own file).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatRole, Usage};

// region:    --- ChatResponse

/// The Chat response of `LocalAdapter::exec_chat` and `LocalAdapter::exec_chat_stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	/// Always `ChatRole::Assistant`.
	pub role: ChatRole,

	/// The response text.
	/// For a successful structured generation, this is the canonical (compact) JSON text of the
	/// structured value. Otherwise, this is the text produced by the model as is.
	pub content: String,

	/// The parsed structured value, when a schema was requested and the output was a JSON value.
	pub structured: Option<Value>,

	/// The model identifier used for this request.
	pub model_id: String,

	/// Estimated usage of the chat response.
	pub usage: Usage,
}

// Getters
impl ChatResponse {
	/// Returns the content as `&str`.
	pub fn content_text_as_str(&self) -> &str {
		&self.content
	}

	/// Consumes the ChatResponse and returns the String content.
	pub fn content_text_into_string(self) -> String {
		self.content
	}

	/// Returns the structured value, if any.
	pub fn structured_value(&self) -> Option<&Value> {
		self.structured.as_ref()
	}
}

// endregion: --- ChatResponse
