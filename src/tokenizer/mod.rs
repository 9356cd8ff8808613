/// Token counting capability for the chunking engine.
///
/// The engine never tokenizes for model input; it only needs deterministic
/// counts to hold chunks under the classifier's budget. Any text, including
/// syntactically incomplete fragments, must be countable.
pub mod codebert;
pub mod mock;

use thiserror::Error;

/// Errors that can occur while counting tokens.
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("tokenizer load failed: {0}")]
    LoadFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}

/// Trait for token counting implementations.
///
/// Implementations must be deterministic and `Send + Sync` so a single
/// counter can be shared across per-file chunking runs.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens the downstream classifier would see for `text`.
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;
}
