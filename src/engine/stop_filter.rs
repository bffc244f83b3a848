//! Stop sequence handling for token-by-token generation.

/// Cuts generated text at the first stop sequence, holding back the tail that could be the
/// start of one, so emitted pieces never contain (part of) a stop sequence.
///
/// The concatenation of every `push` result plus `finish` is the text up to the first stop
/// sequence, whatever the token boundaries.
#[derive(Debug)]
pub struct StopFilter<'a> {
	stop_sequences: &'a [String],
	/// Longest stop sequence length minus one, in bytes.
	hold_len: usize,
	pending: String,
	stopped: bool,
}

impl<'a> StopFilter<'a> {
	pub fn new(stop_sequences: &'a [String]) -> Self {
		let hold_len = stop_sequences.iter().map(String::len).max().unwrap_or(0).saturating_sub(1);
		Self {
			stop_sequences,
			hold_len,
			pending: String::new(),
			stopped: false,
		}
	}

	/// Feed one decoded piece and return the text safe to emit now (possibly empty).
	/// When a stop sequence completes, returns the text before it and the filter is stopped.
	pub fn push(&mut self, piece: &str) -> String {
		if self.stopped {
			return String::new();
		}
		self.pending.push_str(piece);

		if let Some(stop_at) = find_stop(&self.pending, self.stop_sequences) {
			self.stopped = true;
			self.pending.truncate(stop_at);
			return std::mem::take(&mut self.pending);
		}

		let mut split = self.pending.len().saturating_sub(self.hold_len);
		while !self.pending.is_char_boundary(split) {
			split -= 1;
		}
		let held = self.pending.split_off(split);
		std::mem::replace(&mut self.pending, held)
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// The text still held back once generation ends (empty after a stop).
	pub fn finish(self) -> String {
		self.pending
	}
}

/// Byte offset where the first stop sequence starts in `text`, if any.
pub fn find_stop(text: &str, stop_sequences: &[String]) -> Option<usize> {
	stop_sequences
		.iter()
		.filter(|stop| !stop.is_empty())
		.filter_map(|stop| text.find(stop.as_str()))
		.min()
}

// region:    --- Tests


// endregion: --- Tests
