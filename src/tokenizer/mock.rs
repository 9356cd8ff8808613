/// Mock token counter for testing purposes.
///
/// Counts whitespace-separated fragments, so token counts in tests can be
/// read straight off a line without loading tokenizer files.
use super::{TokenCounter, TokenizerError};

/// A deterministic counter: one token per whitespace-separated fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCounter;

impl TokenCounter for MockCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(text.split_whitespace().count())
    }
}
