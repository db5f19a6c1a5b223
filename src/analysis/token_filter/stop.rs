//! Stop filter implementation.
//!
//! Removes common English function words. The default list is the 179-word
//! English list shipped with NLTK. Comparison follows a [`StopwordCase`]
//! policy: with [`StopwordCase::Sensitive`] the raw token is looked up as-is,
//! so `"The"` survives while `"the"` is removed; with
//! [`StopwordCase::Insensitive`] the token is lowercased for the lookup.
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token_filter::Filter;
//! use triage::analysis::token_filter::stop::StopFilter;
//! use triage::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![
//!     Token::new("the", 0),
//!     Token::new("flood", 1),
//!     Token::new("is", 2),
//!     Token::new("rising", 3),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "flood");
//! assert_eq!(result[1].text, "rising");
//! ```

use std::sync::{Arc, LazyLock};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Default English stop words as a set.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<AHashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// How tokens are compared against the stop word list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordCase {
    /// Compare the raw token; capitalized stop words are kept.
    #[default]
    Sensitive,
    /// Lowercase the token before comparing.
    Insensitive,
}

/// A filter that removes stop words from the token stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<AHashSet<String>>,
    /// Case policy used for lookups
    case: StopwordCase,
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: AHashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            case: StopwordCase::default(),
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Set the case policy for lookups.
    pub fn with_case(mut self, case: StopwordCase) -> Self {
        self.case = case;
        self
    }

    /// Check if a word is a stop word under the configured case policy.
    pub fn is_stop_word(&self, word: &str) -> bool {
        match self.case {
            StopwordCase::Sensitive => self.stop_words.contains(word),
            StopwordCase::Insensitive => self.stop_words.contains(&word.to_lowercase()),
        }
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word list is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .filter(|token| !self.is_stop_word(&token.text))
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &StopFilter, words: &[&str]) -> Vec<Token> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter.filter(Box::new(tokens.into_iter())).unwrap().collect()
    }

    #[test]
    fn test_default_list_size() {
        assert_eq!(StopFilter::new().len(), 179);
    }

    #[test]
    fn test_stop_filter_case_sensitive() {
        let filter = StopFilter::new();
        let result = run(&filter, &["The", "the", "water", "is", "here"]);

        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "water"]);
    }

    #[test]
    fn test_stop_filter_case_insensitive() {
        let filter = StopFilter::new().with_case(StopwordCase::Insensitive);
        let result = run(&filter, &["The", "WATER", "IS"]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "WATER");
    }

    #[test]
    fn test_stop_filter_custom_words_keep_positions() {
        let filter = StopFilter::from_words(vec!["the"]);
        let result = run(&filter, &["the", "quick", "the", "flood"]);

        let kept: Vec<(&str, usize)> = result
            .iter()
            .map(|t| (t.text.as_str(), t.position))
            .collect();
        assert_eq!(kept, vec![("quick", 1), ("flood", 3)]);
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(StopFilter::new().name(), "stop");
    }
}
