//! Resolution and loading of GGUF model files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::model::LlamaModel;
use llama_cpp_2::model::params::LlamaModelParams;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::engine::{LoadError, LocalModel, ModelLoader};
use crate::llamacpp::LlamaCppModel;

/// Env var overriding the default models directory.
pub const LLAMACPP_MODELS_DIR_ENV: &str = "LLAMACPP_MODELS_DIR";

const DEFAULT_MODELS_DIR: &str = "~/.cache/llama-models";

const COMMON_MODELS_DIRS: &[&str] = &["~/.cache/llama-models", "~/.cache/huggingface/hub", "./models"];

/// The llama.cpp backend can only be initialized once per process.
static BACKEND: OnceCell<LlamaBackend> = OnceCell::new();

pub(super) fn backend() -> core::result::Result<&'static LlamaBackend, LoadError> {
	BACKEND
		.get_or_try_init(LlamaBackend::init)
		.map_err(|e| LoadError::from(format!("Failed to initialize llama backend: {e}")))
}

/// Loads GGUF models from a base directory.
#[derive(Debug, Clone)]
pub struct LlamaCppLoader {
	models_dir: PathBuf,
}

impl Default for LlamaCppLoader {
	fn default() -> Self {
		let dir = std::env::var(LLAMACPP_MODELS_DIR_ENV).unwrap_or_else(|_| DEFAULT_MODELS_DIR.to_string());
		Self::new(dir)
	}
}

impl LlamaCppLoader {
	/// `models_dir` may start with `~`.
	pub fn new(models_dir: impl AsRef<str>) -> Self {
		let expanded = shellexpand::tilde(models_dir.as_ref());
		Self {
			models_dir: PathBuf::from(expanded.as_ref()),
		}
	}

	pub fn models_dir(&self) -> &Path {
		&self.models_dir
	}
}

impl ModelLoader for LlamaCppLoader {
	fn load(&self, model_id: &str) -> core::result::Result<Arc<dyn LocalModel>, LoadError> {
		let model_path = resolve_model_path(model_id, Some(&self.models_dir))?;
		let backend = backend()?;

		debug!(model_id, path = %model_path.display(), "loading gguf model");
		let model = LlamaModel::load_from_file(backend, &model_path, &LlamaModelParams::default())
			.map_err(|e| LoadError::from(format!("Failed to load model weights from {}: {e}", model_path.display())))?;

		Ok(Arc::new(LlamaCppModel::new(model_id, backend, model)))
	}
}

/// Resolve a model id to a file path.
///
/// Accepts an absolute path, a file name relative to `base_dir`, or a `.gguf` file name found
/// in one of the common model directories.
pub fn resolve_model_path(model_id: &str, base_dir: Option<&Path>) -> core::result::Result<PathBuf, LoadError> {
	let path = Path::new(model_id);

	if path.is_absolute() {
		if path.exists() {
			return Ok(path.to_owned());
		}
		return Err(LoadError::from(format!("model file not found: {}", path.display())));
	}

	if let Some(full_path) = base_dir.map(|base| base.join(model_id)).filter(|p| p.exists()) {
		return Ok(full_path);
	}

	if model_id.ends_with(".gguf") {
		for dir in COMMON_MODELS_DIRS {
			let expanded_dir = shellexpand::tilde(dir);
			let full_path = Path::new(expanded_dir.as_ref()).join(model_id);
			if full_path.exists() {
				return Ok(full_path);
			}
		}
	}

	Err(LoadError::from(format!("model file not found for '{model_id}'")))
}

// region:    --- Tests


// endregion: --- Tests
