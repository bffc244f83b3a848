//! Some support utilities for the tests
//! Note: Must be imported in each test file

#![allow(unused)] // For test support

// region:    --- Modules

mod scripted;
mod seeders;

pub use scripted::*;
pub use seeders::*;

pub type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>;

// endregion: --- Modules

// region:    --- Common Constants

pub const MODEL: &str = "qwen2.5-1.5b-instruct-q4_k_m.gguf";
pub const MODEL_TEMPLATED: &str = "llama-3.2-1b-instruct.gguf";

// endregion: --- Common Constants

// region:    --- Common Adapters

use std::sync::Arc;

use genai_local::LocalAdapter;
use genai_local::engine::StaticCatalog;

/// An adapter over `loader`, with a 2048 tokens context window for both test models.
pub fn common_adapter(loader: &Arc<ScriptedLoader>) -> LocalAdapter {
	LocalAdapter::from_loader(loader.clone()).with_catalog(
		StaticCatalog::new()
			.with_model(MODEL, 2048)
			.with_model(MODEL_TEMPLATED, 2048),
	)
}

/// Install a test subscriber once (filtered by `RUST_LOG`).
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

// endregion: --- Common Adapters
