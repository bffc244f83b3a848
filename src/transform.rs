//! Conversion of chat turns into uniform prompt turns, and JSON instruction injection.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatRequest, ChatRole};
use crate::instruction::render_template;
use crate::schema::Schema;

/// A normalized (role, text) turn, ready for prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
	pub role: String,
	pub content: String,
}

impl PromptMessage {
	pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			role: role.into(),
			content: content.into(),
		}
	}
}

impl From<&ChatMessage> for PromptMessage {
	fn from(message: &ChatMessage) -> Self {
		Self {
			role: message.role.as_str().to_string(),
			content: message.content.extract_text(),
		}
	}
}

/// Normalize chat messages into prompt turns, in order.
pub fn normalize_messages(messages: &[ChatMessage]) -> Vec<PromptMessage> {
	messages.iter().map(PromptMessage::from).collect()
}

/// Normalize a whole request: the eventual `system` content first, then the messages.
pub fn normalize_request(chat_req: &ChatRequest) -> Vec<PromptMessage> {
	let system = chat_req
		.system
		.as_ref()
		.map(|system| PromptMessage::new(ChatRole::System.as_str(), system.clone()));
	system.into_iter().chain(normalize_messages(&chat_req.messages)).collect()
}

/// Return a copy of `messages` where the last user turn has the rendered JSON instructions
/// appended to its content. Without any user turn, the copy is returned unchanged.
pub fn inject_json_instructions(messages: &[PromptMessage], schema: &Schema, template: &str) -> Vec<PromptMessage> {
	let mut messages = messages.to_vec();
	let last_user = messages.iter_mut().rev().find(|m| m.role == ChatRole::User.as_str());
	if let Some(message) = last_user {
		let instruction = render_template(template, &schema.describe());
		message.content.push_str(&instruction);
	}
	messages
}

/// Plain prompt used when the model has no chat template:
/// one `role: content` line per turn, then the `assistant:` cue.
pub fn plain_prompt(messages: &[PromptMessage]) -> String {
	let mut prompt = String::new();
	for message in messages {
		prompt.push_str(&format!("{}: {}\n", message.role, message.content));
	}
	prompt.push_str("assistant:");
	prompt
}

// region:    --- Tests


// endregion: --- Tests
