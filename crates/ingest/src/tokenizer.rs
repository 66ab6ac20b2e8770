//! Token counting collaborator.
//!
//! The chunker and reconciler take a `&dyn Tokenizer` instead of reaching for
//! a process-wide client, so callers can swap in a model tokenizer or a
//! batching/caching wrapper.

use thiserror::Error;

/// Failure reported by a tokenizer. Passed through to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tokenizer {tokenizer} failed: {message}")]
pub struct TokenizerError {
    pub tokenizer: String,
    pub message: String,
}

impl TokenizerError {
    pub fn new(tokenizer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tokenizer: tokenizer.into(),
            message: message.into(),
        }
    }
}

/// Counts tokens in a piece of text.
///
/// Must be deterministic for identical input, otherwise `order`/`total_order`
/// are not reproducible across re-ingestion.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TokenizerError>;

    /// Short name used in logs and errors.
    fn name(&self) -> &str;
}

/// Approximate token count via whitespace splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(text.split_whitespace().count())
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_count_ignores_runs() {
        let tok = WhitespaceTokenizer;
        assert_eq!(tok.count("hello world").unwrap(), 2);
        assert_eq!(tok.count("  spaced \n\t out  ").unwrap(), 2);
        assert_eq!(tok.count("").unwrap(), 0);
    }

    #[test]
    fn error_message_names_tokenizer() {
        let err = TokenizerError::new("bpe", "timeout");
        assert_eq!(err.to_string(), "tokenizer bpe failed: timeout");
    }
}
