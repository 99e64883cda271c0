//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, VerityError};

/// Pattern matching runs of ASCII letters. Anything else acts as a separator,
/// which is the same as replacing every non-letter with a space and splitting
/// on whitespace.
pub const ASCII_LETTERS_PATTERN: &str = r"[A-Za-z]+";

/// A regex-based tokenizer that extracts tokens using regular expressions.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a tokenizer that keeps only runs of ASCII letters.
    pub fn letters() -> Result<Self> {
        Self::with_pattern(ASCII_LETTERS_PATTERN)
    }

    fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| VerityError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| Token::with_offsets(mat.as_str(), position, mat.start(), mat.end()))
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokenizer: &RegexTokenizer, input: &str) -> Vec<String> {
        tokenizer
            .tokenize(input)
            .unwrap()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn test_letters_split_on_non_letters() {
        let tokenizer = RegexTokenizer::letters().unwrap();
        assert_eq!(
            texts(&tokenizer, "U.S. troops, 2024's budget!"),
            vec!["U", "S", "troops", "s", "budget"]
        );
    }

    #[test]
    fn test_letters_drops_non_ascii() {
        let tokenizer = RegexTokenizer::letters().unwrap();
        assert_eq!(texts(&tokenizer, "café naïve"), vec!["caf", "na", "ve"]);
    }

    #[test]
    fn test_empty_and_non_alphabetic_input() {
        let tokenizer = RegexTokenizer::letters().unwrap();
        assert!(texts(&tokenizer, "").is_empty());
        assert!(texts(&tokenizer, "12345 !!! ---").is_empty());
    }

    #[test]
    fn test_offsets() {
        let tokenizer = RegexTokenizer::letters().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("hi, there").unwrap().collect();
        assert_eq!(tokens[1].start_offset, 4);
        assert_eq!(tokens[1].end_offset, 9);
        assert_eq!(tokens[1].position, 1);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexTokenizer::with_pattern("(").is_err());
    }
}
