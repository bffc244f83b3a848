// region:    --- Modules

mod tool_base;

pub use tool_base::*;

// endregion: --- Modules
