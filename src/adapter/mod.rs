// region:    --- Modules

mod adapter_config;
mod local_adapter;
mod support;

pub use adapter_config::*;
pub use local_adapter::*;
pub use support::{check_context_length, estimate_tokens};

// endregion: --- Modules
