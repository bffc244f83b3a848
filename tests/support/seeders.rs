use genai_local::chat::{ChatMessage, ChatRequest};
use serde_json::{Value, json};

pub fn seed_profile_schema() -> Value {
	json!({
		"type": "object",
		"properties": {
			"name": {"type": "string"},
			"age": {"type": "integer"}
		},
		"required": ["name", "age"]
	})
}

/// The profile schema, with keys in symbol notation.
pub fn seed_profile_schema_symbol_keys() -> Value {
	json!({
		":type": "object",
		":properties": {
			":name": {":type": "string"},
			":age": {":type": "integer"}
		},
		":required": ["name", "age"]
	})
}

pub fn seed_profile_request() -> ChatRequest {
	ChatRequest::new(vec![ChatMessage::user("Generate a profile for Bob, 28")])
}

pub fn seed_conversation() -> ChatRequest {
	ChatRequest::new(vec![
		ChatMessage::user("Hello"),
		ChatMessage::assistant("Hi! How can I help?"),
		ChatMessage::user("Tell me about Bob"),
	])
	.with_system("You are a helpful assistant.")
}
