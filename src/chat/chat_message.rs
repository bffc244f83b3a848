//! This module contains the chat message and role types.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::chat::MessageContent;

// region:    --- ChatRole

/// The role of a chat message turn.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
	#[display("system")]
	System,
	#[display("user")]
	User,
	#[display("assistant")]
	Assistant,
}

impl ChatRole {
	/// Serialize to the lowercase static str used in prompts
	#[must_use]
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::System => "system",
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}
}

// endregion: --- ChatRole

// region:    --- ChatMessage

/// A single conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: ChatRole,
	pub content: MessageContent,
}

/// Constructors
impl ChatMessage {
	/// Create a new ChatMessage with the role `ChatRole::System`.
	pub fn system(content: impl Into<MessageContent>) -> Self {
		Self {
			role: ChatRole::System,
			content: content.into(),
		}
	}

	/// Create a new ChatMessage with the role `ChatRole::User`.
	pub fn user(content: impl Into<MessageContent>) -> Self {
		Self {
			role: ChatRole::User,
			content: content.into(),
		}
	}

	/// Create a new ChatMessage with the role `ChatRole::Assistant`.
	pub fn assistant(content: impl Into<MessageContent>) -> Self {
		Self {
			role: ChatRole::Assistant,
			content: content.into(),
		}
	}
}

// endregion: --- ChatMessage
