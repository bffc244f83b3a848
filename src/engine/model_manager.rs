//! ModelManager handles loading and caching of local models to avoid
//! reloading the same model multiple times.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::engine::{LoadError, LocalModel, ModelLoader};
use crate::{Error, Result};

/// Caches loaded models by model id, with at most one entry per id.
pub struct ModelManager {
	loader: Arc<dyn ModelLoader>,
	models: RwLock<HashMap<String, Arc<dyn LocalModel>>>,
}

impl ModelManager {
	pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
		Self {
			loader,
			models: RwLock::new(HashMap::new()),
		}
	}

	/// Load a model by id, using cache if already loaded.
	///
	/// Loader failures are classified into `Error::TokenizerNotFound`, `Error::ModelNotFound`
	/// or `Error::ModelLoadFailed`, all carrying the original error text.
	pub fn load_model(&self, model_id: &str) -> Result<Arc<dyn LocalModel>> {
		// Check cache first
		{
			let models = self
				.models
				.read()
				.map_err(|e| Error::Internal(format!("Failed to read models cache: {e}")))?;

			if let Some(cached_model) = models.get(model_id) {
				return Ok(cached_model.clone());
			}
		}

		// Load model if not cached
		let loaded_model = self
			.loader
			.load(model_id)
			.map_err(|err| classify_load_error(model_id, &err))?;
		info!(model_id, "model loaded");

		// Cache the loaded model (a concurrent load of the same id keeps the first entry)
		let mut models = self
			.models
			.write()
			.map_err(|e| Error::Internal(format!("Failed to write to models cache: {e}")))?;

		Ok(models.entry(model_id.to_string()).or_insert(loaded_model).clone())
	}

	/// Clear all cached models to free memory
	pub fn clear_cache(&self) -> Result<()> {
		let mut models = self
			.models
			.write()
			.map_err(|e| Error::Internal(format!("Failed to clear models cache: {e}")))?;

		models.clear();
		Ok(())
	}

	/// Get the number of cached models
	pub fn cache_size(&self) -> Result<usize> {
		let models = self
			.models
			.read()
			.map_err(|e| Error::Internal(format!("Failed to read models cache: {e}")))?;

		Ok(models.len())
	}
}

impl std::fmt::Debug for ModelManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let cached = self.models.read().map(|models| models.len()).unwrap_or_default();
		f.debug_struct("ModelManager").field("cached_models", &cached).finish()
	}
}

// region:    --- Load Error Classification

const NOT_FOUND_MARKERS: &[&str] = &[
	"not found",
	"failed to find",
	"no such file",
	"does not exist",
	"404",
	"missing",
];

/// Markers of a model file, as opposed to the bare word "model".
const MODEL_FILE_MARKERS: &[&str] = &["model file", "model path", ".gguf", "weights", "safetensors"];

/// Turn a raw loader error into a user-actionable error, keeping the original text.
pub fn classify_load_error(model_id: &str, err: &LoadError) -> Error {
	let cause = err.to_string();
	let lower = cause.to_lowercase();
	let not_found = NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker));
	let model_id = model_id.to_string();

	if lower.contains("tokenizer") && not_found {
		Error::TokenizerNotFound { model_id, cause }
	} else if not_found && MODEL_FILE_MARKERS.iter().any(|marker| lower.contains(marker)) {
		Error::ModelNotFound { model_id, cause }
	} else {
		Error::ModelLoadFailed { model_id, cause }
	}
}

// endregion: --- Load Error Classification

// region:    --- Tests


// endregion: --- Tests
