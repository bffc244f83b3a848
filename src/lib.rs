//! Local model provider adapter for genai-style chat clients.
//!
//! `genai_local` drives a locally executing (typically quantized) model instead of a remote HTTP
//! API. It turns a generic conversation into a prompt, enforces the model context window, and
//! dispatches to plain or schema-constrained generation, in blocking or streaming mode.
//!
//! The inference engine itself is a collaborator behind the [`engine::LocalModel`] and
//! [`engine::ModelLoader`] traits. A llama.cpp implementation ships behind the `llamacpp`
//! feature.
//!
//! ```no_run
//! use genai_local::LocalAdapter;
//! use genai_local::chat::{ChatMessage, ChatOptions, ChatRequest};
//! use serde_json::json;
//! # fn demo(adapter: &LocalAdapter) -> genai_local::Result<()> {
//! let schema = json!({
//! 	"type": "object",
//! 	"properties": {"name": {"type": "string"}, "age": {"type": "integer"}},
//! 	"required": ["name", "age"]
//! });
//! let chat_req = ChatRequest::new(vec![ChatMessage::user("Generate a profile for Bob, 28")]);
//! let options = ChatOptions::default().with_json_schema(schema);
//! let res = adapter.exec_chat("qwen2.5-1.5b-instruct-q4_k_m.gguf", chat_req, Some(&options))?;
//! println!("{}", res.content);
//! # Ok(())
//! # }
//! ```

// region:    --- Modules

mod adapter;
mod error;

pub mod chat;
pub mod engine;
pub mod instruction;
pub mod schema;
pub mod transform;

#[cfg(feature = "llamacpp")]
pub mod llamacpp;

pub use adapter::*;
pub use error::{Error, Result};

// endregion: --- Modules
