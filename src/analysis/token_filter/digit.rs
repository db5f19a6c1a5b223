//! Digit filter implementation.
//!
//! Removes any token that contains a decimal digit (`"5"`, `"2010"`,
//! `"covid19"`). Numbers, dates and phone numbers carry little category
//! signal in relief messages.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that removes tokens containing a digit.
#[derive(Clone, Debug, Default)]
pub struct DigitFilter;

impl DigitFilter {
    /// Create a new digit filter.
    pub fn new() -> Self {
        DigitFilter
    }
}

impl Filter for DigitFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .filter(|token| !token.text.chars().any(|c| c.is_numeric()))
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "digit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_filter() {
        let filter = DigitFilter::new();
        let tokens = vec![
            Token::new("people", 0),
            Token::new("5", 1),
            Token::new("covid19", 2),
            Token::new("water", 3),
        ];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["people", "water"]);
    }
}
