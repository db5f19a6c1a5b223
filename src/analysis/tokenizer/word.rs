//! Word tokenizer implementation.
//!
//! Splits text on Unicode word boundaries (UAX #29). Whitespace segments are
//! discarded while punctuation is kept as separate tokens, so that later
//! filters decide what to drop. English clitics are detached the way the
//! Penn Treebank does it: `"don't"` becomes `"do"` + `"n't"` and `"it's"`
//! becomes `"it"` + `"'s"`.
//!
//! # Examples
//!
//! ```
//! use triage::analysis::tokenizer::Tokenizer;
//! use triage::analysis::tokenizer::word::WordTokenizer;
//!
//! let tokenizer = WordTokenizer::new();
//! let texts: Vec<String> = tokenizer
//!     .tokenize("We don't have food.")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(texts, vec!["We", "do", "n't", "have", "food", "."]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Clitic suffixes split off the end of a word, longest first.
const CLITICS: &[&str] = &["n't", "'re", "'ve", "'ll", "'s", "'d", "'m"];

/// A tokenizer that splits text on Unicode word boundaries.
#[derive(Clone, Debug)]
pub struct WordTokenizer {
    /// Whether to detach English clitics from their host word
    split_clitics: bool,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WordTokenizer {
    /// Create a new word tokenizer with clitic splitting enabled.
    pub fn new() -> Self {
        WordTokenizer {
            split_clitics: true,
        }
    }

    /// Enable or disable clitic splitting.
    pub fn with_clitic_splitting(mut self, split: bool) -> Self {
        self.split_clitics = split;
        self
    }

    /// Find the byte index where a clitic suffix starts, if any.
    fn clitic_boundary(word: &str) -> Option<usize> {
        let normalized: String = word
            .chars()
            .map(|c| if c == '\u{2019}' { '\'' } else { c })
            .flat_map(char::to_lowercase)
            .collect();

        for clitic in CLITICS {
            if normalized.len() > clitic.len() && normalized.ends_with(clitic) {
                // Walk back the same number of chars in the original word so
                // that curly apostrophes keep correct byte offsets.
                let clitic_chars = clitic.chars().count();
                let (split, _) = word.char_indices().rev().nth(clitic_chars - 1)?;
                if split > 0 {
                    return Some(split);
                }
            }
        }
        None
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;

        for (start, segment) in text.split_word_bound_indices() {
            if segment.chars().all(char::is_whitespace) {
                continue;
            }

            let boundary = if self.split_clitics {
                Self::clitic_boundary(segment)
            } else {
                None
            };

            match boundary {
                Some(split) => {
                    let (host, clitic) = segment.split_at(split);
                    tokens.push(Token::with_offsets(host, position, start, start + split));
                    tokens.push(Token::with_offsets(
                        clitic,
                        position + 1,
                        start + split,
                        start + segment.len(),
                    ));
                    position += 2;
                }
                None => {
                    tokens.push(Token::with_offsets(
                        segment,
                        position,
                        start,
                        start + segment.len(),
                    ));
                    position += 1;
                }
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokenizer: &WordTokenizer, input: &str) -> Vec<String> {
        tokenizer
            .tokenize(input)
            .unwrap()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn test_word_tokenizer() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("need water").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "need");
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 4);
        assert_eq!(tokens[1].text, "water");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 5);
    }

    #[test]
    fn test_punctuation_is_kept() {
        let tokenizer = WordTokenizer::new();
        assert_eq!(
            texts(&tokenizer, "Help!!! Now."),
            vec!["Help", "!", "!", "!", "Now", "."]
        );
    }

    #[test]
    fn test_clitic_splitting() {
        let tokenizer = WordTokenizer::new();
        assert_eq!(texts(&tokenizer, "It's bad"), vec!["It", "'s", "bad"]);
        assert_eq!(texts(&tokenizer, "we can't"), vec!["we", "ca", "n't"]);
        assert_eq!(texts(&tokenizer, "they\u{2019}re"), vec!["they", "\u{2019}re"]);
    }

    #[test]
    fn test_clitic_splitting_disabled() {
        let tokenizer = WordTokenizer::new().with_clitic_splitting(false);
        assert_eq!(texts(&tokenizer, "It's"), vec!["It's"]);
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = WordTokenizer::new();
        assert!(texts(&tokenizer, "").is_empty());
        assert!(texts(&tokenizer, "   \n\t").is_empty());
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WordTokenizer::new().name(), "word");
    }
}
