//! llama.cpp engine for local GGUF models, using the llama.cpp bindings.
//!
//! `LlamaCppLoader` resolves and loads model files; the loaded `LlamaCppModel` implements
//! [`crate::engine::LocalModel`], with grammar-constrained decoding for structured output.

// region:    --- Modules

mod loader;
mod model;

pub use loader::*;
pub use model::*;

// endregion: --- Modules
