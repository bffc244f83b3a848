//! Streaming chunk delivered to the `exec_chat_stream` callback.

use serde::{Deserialize, Serialize};

use crate::chat::ChatRole;

/// One unit of streamed output.
///
/// The callback receives one chunk per generated token, in order, on the calling thread.
/// After the last token, it receives exactly one more chunk with empty content: the end of
/// stream marker. Use [`StreamChunk::is_end`] rather than rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
	pub role: ChatRole,
	pub content: String,
}

impl StreamChunk {
	pub fn token(content: impl Into<String>) -> Self {
		Self {
			role: ChatRole::Assistant,
			content: content.into(),
		}
	}

	pub fn end() -> Self {
		Self {
			role: ChatRole::Assistant,
			content: String::new(),
		}
	}

	pub fn is_end(&self) -> bool {
		self.content.is_empty()
	}
}
