use serde::{Deserialize, Serialize};

/// Token usage of a chat response.
///
/// Local engines do not report exact counts through this adapter, so these are estimates
/// (one token per four characters).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
	/// Estimated tokens of the normalized prompt turns.
	pub prompt_tokens: Option<i32>,
	/// Estimated tokens of the response content.
	pub completion_tokens: Option<i32>,
	/// Sum of the two above.
	pub total_tokens: Option<i32>,
}

impl Usage {
	pub fn from_estimates(prompt_tokens: usize, completion_tokens: usize) -> Self {
		let prompt = i32::try_from(prompt_tokens).unwrap_or(i32::MAX);
		let completion = i32::try_from(completion_tokens).unwrap_or(i32::MAX);
		Self {
			prompt_tokens: Some(prompt),
			completion_tokens: Some(completion),
			total_tokens: Some(prompt.saturating_add(completion)),
		}
	}
}
