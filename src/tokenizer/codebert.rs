/// Token counter backed by the HuggingFace `tokenizers` crate.
///
/// Loads the classifier's own `tokenizer.json` so counts match what the
/// model will actually receive.
use std::path::Path;

use tokenizers::Tokenizer;

use super::{TokenCounter, TokenizerError};

/// Counts tokens with a CodeBERT-style subword tokenizer.
pub struct CodeBertCounter {
    inner: Tokenizer,
}

impl CodeBertCounter {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// Truncation and padding are disabled: the engine needs the true length
    /// of a span, not a model-ready input.
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        if !path.exists() {
            return Err(TokenizerError::LoadFailed(format!(
                "tokenizer file not found: {}",
                path.display()
            )));
        }

        let mut inner =
            Tokenizer::from_file(path).map_err(|e| TokenizerError::LoadFailed(e.to_string()))?;

        let _ = inner.with_truncation(None);
        inner.with_padding(None);

        Ok(Self { inner })
    }

    /// Vocabulary size of the loaded tokenizer.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(false)
    }
}

impl TokenCounter for CodeBertCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        // No special tokens: budget accounting is over raw subwords, the
        // [CLS]/[SEP] overhead is the classifier's concern.
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::EncodingFailed(e.to_string()))?;
        Ok(encoding.get_ids().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let result = CodeBertCounter::from_file(Path::new("/nonexistent/tokenizer.json"));
        assert!(result.is_err());
    }

    /// This test requires the actual tokenizer.json file.
    /// Run with: cargo test codebert -- --ignored
    #[test]
    #[ignore]
    fn test_count_with_real_tokenizer() {
        let path = Path::new("models/codebert-base/tokenizer.json");
        if !path.exists() {
            eprintln!("Skipping: tokenizer file not downloaded");
            return;
        }

        let counter = CodeBertCounter::from_file(path).unwrap();
        let short = counter.count_tokens("function f() {}").unwrap();
        let long = counter
            .count_tokens("function transfer(address to, uint256 amount) public returns (bool) {")
            .unwrap();

        assert!(short > 0);
        assert!(long > short, "longer span must count more tokens");
        assert_eq!(
            counter.count_tokens("function f() {}").unwrap(),
            short,
            "counting must be deterministic"
        );
    }
}
