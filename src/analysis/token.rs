//! Token types and utilities for text analysis.
//!
//! A [`Token`] is the unit that flows from a tokenizer through the filter
//! chain. Filters either rewrite a token's text or drop it from the stream.
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token::Token;
//!
//! let token = Token::with_offsets("water", 3, 18, 23);
//! assert_eq!(token.text, "water");
//! assert_eq!(token.position, 3);
//! assert_eq!(token.end_offset, 23);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,
}

/// Whether a character counts as punctuation or a symbol.
///
/// Anything that is neither alphanumeric nor whitespace qualifies; the
/// underscore is included so that `"__"` is treated as punctuation.
pub fn is_punctuation_or_symbol(c: char) -> bool {
    c == '_' || !(c.is_alphanumeric() || c.is_whitespace())
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        let mut token = Token::new(text, position);
        token.start_offset = start_offset;
        token.end_offset = end_offset;
        token
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the token text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
