//! Text analysis module for triage.
//!
//! Provides tokenization and the normalization chain that turns a raw relief
//! message into the cleaned token sequence consumed by the term-based feature
//! extractors.
//!
//! # Examples
//!
//! ```
//! let tokens = triage::analysis::tokenize("Report 5 people need water!!!").unwrap();
//! assert_eq!(tokens, vec!["report", "people", "need", "water"]);
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

use std::sync::LazyLock;

pub use analyzer::{Analyzer, AnalyzerConfig, MessageAnalyzer, PipelineAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;

use crate::error::Result;

static DEFAULT_ANALYZER: LazyLock<MessageAnalyzer> = LazyLock::new(MessageAnalyzer::new);

/// Normalize a raw message into its cleaned token sequence using the default
/// [`MessageAnalyzer`]. The result may be empty (e.g. for punctuation-only
/// input).
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    DEFAULT_ANALYZER.tokens(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_digits_and_punctuation() {
        let tokens = tokenize("Report 5 people need water!!!").unwrap();

        assert!(!tokens.is_empty());
        assert!(tokens.iter().all(|t| !t.chars().any(|c| c.is_numeric())));
        assert!(
            tokens
                .iter()
                .all(|t| !t.chars().all(token::is_punctuation_or_symbol))
        );
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "We need food, water and tents in Leogane. Roads were destroyed!";
        assert_eq!(tokenize(text).unwrap(), tokenize(text).unwrap());
    }
}
