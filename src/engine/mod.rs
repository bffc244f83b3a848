//! The generation engine boundary.
//!
//! The adapter does not tokenize, sample or load weights itself. It drives an engine through:
//! - [`ModelLoader`]: turns a model id into a loaded [`LocalModel`] (cached by [`ModelManager`]),
//! - [`LocalModel`]: chat templating, plain, structured and streaming generation,
//! - [`ModelCatalog`]: model metadata (context window).

// region:    --- Modules

mod catalog;
mod local_model;
mod model_manager;
mod stop_filter;

pub use catalog::*;
pub use local_model::*;
pub use model_manager::*;
pub use stop_filter::*;

// endregion: --- Modules
