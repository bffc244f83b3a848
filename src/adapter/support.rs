//! Support functions for the `LocalAdapter`: token estimates, context checks, JSON recovery.

use std::backtrace::Backtrace;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::{Error, Result};

/// Characters per estimated token.
const CHARS_PER_TOKEN: f64 = 4.0;

/// Lines of backtrace kept when logging a structured generation failure.
const BACKTRACE_EXCERPT_LINES: usize = 8;

/// Estimate the token count of `text`: characters / 4, rounded to the nearest integer.
pub fn estimate_tokens(text: &str) -> usize {
	(text.chars().count() as f64 / CHARS_PER_TOKEN).round() as usize
}

/// Fail with `Error::ContextLengthExceeded` when the estimated prompt tokens exceed
/// `context_window - reserved`. The prompt is never truncated.
pub fn check_context_length(prompt: &str, model_id: &str, context_window: usize, reserved: usize) -> Result<()> {
	let estimated_tokens = estimate_tokens(prompt);
	let budget = context_window.saturating_sub(reserved);

	if estimated_tokens > budget {
		return Err(Error::ContextLengthExceeded {
			estimated_tokens,
			model_id: model_id.to_string(),
			context_window,
			reserved,
		});
	}
	Ok(())
}

/// Outermost `{...}` block, across lines.
static JSON_BLOCK_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// Try to recover a JSON object from raw model output:
/// the whole text first, then the outermost `{...}` block.
pub(super) fn recover_json(raw: &str) -> Result<Option<Value>> {
	if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw.trim()) {
		return Ok(Some(value));
	}

	let re = JSON_BLOCK_RE
		.as_ref()
		.ok_or_else(|| Error::Internal("JSON block regex failed to compile".to_string()))?;
	let recovered = re
		.find(raw)
		.and_then(|block| serde_json::from_str::<Value>(block.as_str()).ok())
		.filter(Value::is_object);

	Ok(recovered)
}

/// The `required` fields absent from `value`.
pub(super) fn missing_required_fields<'a>(required: &[&'a str], value: &Value) -> Vec<&'a str> {
	match value.as_object() {
		Some(object) => required.iter().copied().filter(|field| !object.contains_key(*field)).collect(),
		None => required.to_vec(),
	}
}

/// First lines of the current backtrace (empty unless `RUST_BACKTRACE` is set).
pub(super) fn backtrace_excerpt() -> String {
	Backtrace::capture()
		.to_string()
		.lines()
		.take(BACKTRACE_EXCERPT_LINES)
		.collect::<Vec<_>>()
		.join("\n")
}

// region:    --- Tests


// endregion: --- Tests
