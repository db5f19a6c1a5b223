//! Punctuation filter implementation.
//!
//! Drops tokens that carry no lexical content, such as `"!!!"`, `"--"` or
//! `"..."`.

use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenStream, is_punctuation_or_symbol};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Which tokens count as punctuation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationMode {
    /// Drop tokens made only of punctuation/symbol characters.
    #[default]
    Entire,
    /// Drop tokens that start with a punctuation/symbol character
    /// (also removes clitics such as `"'s"`).
    Leading,
}

/// A filter that removes punctuation-only tokens.
#[derive(Clone, Debug, Default)]
pub struct PunctuationFilter {
    mode: PunctuationMode,
}

impl PunctuationFilter {
    /// Create a new punctuation filter in [`PunctuationMode::Entire`] mode.
    pub fn new() -> Self {
        PunctuationFilter::default()
    }

    /// Set the matching mode.
    pub fn with_mode(mut self, mode: PunctuationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check whether a token should be dropped.
    pub fn is_punctuation(&self, text: &str) -> bool {
        match self.mode {
            PunctuationMode::Entire => !text.is_empty() && text.chars().all(is_punctuation_or_symbol),
            PunctuationMode::Leading => text.chars().next().is_some_and(is_punctuation_or_symbol),
        }
    }
}

impl Filter for PunctuationFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .filter(|token| !token.text.is_empty() && !self.is_punctuation(&token.text))
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "punctuation"
    }
}
