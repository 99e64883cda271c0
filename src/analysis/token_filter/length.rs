//! Minimum length filter implementation.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Drops tokens whose length is less than or equal to `min_length`.
///
/// A threshold of 0 keeps everything.
///
/// # Examples
///
/// ```
/// use verity::analysis::token_filter::Filter;
/// use verity::analysis::token_filter::length::LengthFilter;
/// use verity::analysis::token::Token;
///
/// let filter = LengthFilter::new(2);
/// let tokens = vec![Token::new("us", 0), Token::new("army", 1)];
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[0].text, "army");
/// ```
#[derive(Clone, Debug, Default)]
pub struct LengthFilter {
    min_length: usize,
}

impl LengthFilter {
    pub fn new(min_length: usize) -> Self {
        LengthFilter { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Filter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        if self.min_length == 0 {
            return Ok(tokens);
        }

        let min_length = self.min_length;
        let filtered_tokens: Vec<Token> =
            tokens.filter(|token| token.len() > min_length).collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}
