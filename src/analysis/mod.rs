//! Text analysis module for Verity.
//!
//! Tokenization and filtering used to normalize news text before it is
//! vectorized. The same pipeline runs during training and at inference.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
