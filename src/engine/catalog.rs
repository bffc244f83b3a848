use std::collections::HashMap;

/// Model metadata lookup.
pub trait ModelCatalog: Send + Sync {
	/// The context window (input + response tokens) of `model_id`, if known.
	fn context_window(&self, model_id: &str) -> Option<usize>;
}

/// A catalog backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
	context_windows: HashMap<String, usize>,
}

impl StaticCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_model(mut self, model_id: impl Into<String>, context_window: usize) -> Self {
		self.context_windows.insert(model_id.into(), context_window);
		self
	}
}

impl ModelCatalog for StaticCatalog {
	fn context_window(&self, model_id: &str) -> Option<usize> {
		self.context_windows.get(model_id).copied()
	}
}
