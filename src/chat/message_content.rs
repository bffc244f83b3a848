//! Message content shapes accepted by the adapter, and their text extraction.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// region:    --- MessageContent

/// The content of a chat message turn.
///
/// Hosts hand over turns in different shapes. Each shape has its own text extraction rule
/// (see [`MessageContent::extract_text`]), applied once when the prompt turns are normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
	/// Plain text, passed through as is.
	Text(String),

	/// Ordered typed parts. Only `text` parts contribute to the prompt.
	Parts(Vec<ContentPart>),

	/// Primary text plus attachments.
	Rich(RichContent),

	/// Any other shape. Coerced to its textual representation.
	Value(Value),
}

/// Constructors
impl MessageContent {
	pub fn from_text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn from_parts(parts: impl Into<Vec<ContentPart>>) -> Self {
		Self::Parts(parts.into())
	}
}

/// Getters
impl MessageContent {
	/// Returns the text if this is a `MessageContent::Text`. Otherwise, returns None.
	pub fn text_as_str(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Extract the prompt text of this content.
	///
	/// - `Text`: as is.
	/// - `Rich`: primary text then each textual attachment, joined with single spaces.
	/// - `Parts`: the `text` parts only, joined with single spaces. Other parts are dropped.
	/// - `Value`: strings as is, anything else as compact JSON.
	pub fn extract_text(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Rich(rich) => rich.extract_text(),
			Self::Parts(parts) => parts.iter().filter_map(ContentPart::text).collect::<Vec<_>>().join(" "),
			Self::Value(Value::String(text)) => text.clone(),
			Self::Value(value) => value.to_string(),
		}
	}
}

impl From<&str> for MessageContent {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<&String> for MessageContent {
	fn from(text: &String) -> Self {
		Self::Text(text.clone())
	}
}

impl From<String> for MessageContent {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Vec<ContentPart>> for MessageContent {
	fn from(parts: Vec<ContentPart>) -> Self {
		Self::Parts(parts)
	}
}

impl From<RichContent> for MessageContent {
	fn from(rich: RichContent) -> Self {
		Self::Rich(rich)
	}
}

// endregion: --- MessageContent

// region:    --- ContentPart

/// A typed content part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
	Text { text: String },
	/// `data` is either a URL or base64 content. Never sent to the local engine.
	Image { mime_type: String, data: String },
	/// Any part type this adapter does not know about.
	#[serde(other)]
	Unsupported,
}

impl ContentPart {
	pub fn from_text(text: impl Into<String>) -> Self {
		Self::Text { text: text.into() }
	}

	pub fn from_image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
		Self::Image {
			mime_type: mime_type.into(),
			data: data.into(),
		}
	}

	/// The text of a `text` part, None for every other part type.
	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text { text } => Some(text),
			_ => None,
		}
	}
}

// endregion: --- ContentPart

// region:    --- RichContent

/// Content made of a primary text and attachments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RichContent {
	pub text: Option<String>,
	#[serde(default)]
	pub attachments: Vec<Attachment>,
}

impl RichContent {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			attachments: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_attachment(mut self, attachment: Attachment) -> Self {
		self.attachments.push(attachment);
		self
	}

	fn extract_text(&self) -> String {
		let primary = self.text.iter().filter(|t| !t.is_empty()).cloned();
		let attached = self.attachments.iter().filter_map(Attachment::text).filter(|t| !t.is_empty());
		primary.chain(attached).collect::<Vec<_>>().join(" ")
	}
}

// endregion: --- RichContent

// region:    --- Attachment

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
	pub name: Option<String>,
	pub mime_type: Option<String>,
	pub data: Option<AttachmentData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttachmentData {
	Text(String),
	Base64(String),
}

/// Constructors
impl Attachment {
	pub fn from_text(text: impl Into<String>) -> Self {
		Self {
			name: None,
			mime_type: Some("text/plain".to_string()),
			data: Some(AttachmentData::Text(text.into())),
		}
	}

	pub fn from_base64(mime_type: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			name: None,
			mime_type: Some(mime_type.into()),
			data: Some(AttachmentData::Base64(content.into())),
		}
	}

	#[must_use]
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

impl Attachment {
	/// The textual data of this attachment, if it has any.
	///
	/// Base64 payloads only count when the MIME type is textual and they decode to UTF-8.
	pub fn text(&self) -> Option<String> {
		match self.data.as_ref()? {
			AttachmentData::Text(text) => Some(text.clone()),
			AttachmentData::Base64(content) => {
				if !self.mime_type.as_deref().is_some_and(is_textual_mime) {
					return None;
				}
				let bytes = BASE64.decode(content.trim()).ok()?;
				String::from_utf8(bytes).ok()
			}
		}
	}
}

fn is_textual_mime(mime: &str) -> bool {
	let mime = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
	mime.starts_with("text/") || matches!(mime.as_str(), "application/json" | "application/xml")
}

// endregion: --- Attachment

// region:    --- Tests


// endregion: --- Tests
