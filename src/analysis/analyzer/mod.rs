//! Analyzers combine a tokenizer with a chain of filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Tokens
//! ```
//!
//! [`NewsAnalyzer`] is the pipeline every model in this crate is trained and
//! served with.

mod analyzer;
mod news;
mod pipeline;

pub use analyzer::Analyzer;
pub use news::{NewsAnalyzer, NormalizerConfig, normalize};
pub use pipeline::PipelineAnalyzer;
