//! Token filter implementations for token transformation.
//!
//! Filters transform the token stream produced by a tokenizer. Message
//! normalization is a chain of them:
//!
//! ```text
//! WordTokenizer → Stop → Lowercase → Lemma → Punctuation → Digit
//! ```
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`lowercase::LowercaseFilter`] - Lowercases and trims tokens
//! - [`lemma::LemmaFilter`] - Reduces verbs to their base form
//! - [`punctuation::PunctuationFilter`] - Removes punctuation/symbol-only tokens
//! - [`digit::DigitFilter`] - Removes tokens containing a digit
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token_filter::Filter;
//! use triage::analysis::token_filter::lowercase::LowercaseFilter;
//! use triage::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Water", 0), Token::new(" FOOD ", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "water");
//! assert_eq!(filtered[1].text, "food");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// Filters receive a stream of tokens and produce a new stream, allowing
/// them to modify, mark, or drop tokens. The trait requires `Send + Sync`
/// to allow use in concurrent contexts.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod digit;
pub mod lemma;
pub mod lowercase;
pub mod punctuation;
pub mod stop;
