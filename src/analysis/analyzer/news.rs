//! The news text normalizer.
//!
//! Keeps runs of ASCII letters, lowercases them, drops English stop words and,
//! optionally, short tokens. The surviving tokens are joined with single
//! spaces in their original order.
//!
//! Training and inference must run byte-identical normalization. The
//! [`NormalizerConfig`] a model was trained with is stored inside the
//! vectorizer artifact and the inference side rebuilds its analyzer from it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LengthFilter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::Result;

/// Normalization parameters persisted alongside a fitted vectorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NormalizerConfig {
    /// Tokens with `len <= min_token_length` are dropped. 0 disables the check.
    pub min_token_length: usize,
}

impl NormalizerConfig {
    pub fn new(min_token_length: usize) -> Self {
        NormalizerConfig { min_token_length }
    }
}

/// Analyzer implementing the news normalization pipeline.
#[derive(Clone, Debug)]
pub struct NewsAnalyzer {
    config: NormalizerConfig,
    inner: PipelineAnalyzer,
}

impl NewsAnalyzer {
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let mut inner = PipelineAnalyzer::new(Arc::new(RegexTokenizer::letters()?))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::new()));

        if config.min_token_length > 0 {
            inner = inner.add_filter(Arc::new(LengthFilter::new(config.min_token_length)));
        }

        Ok(NewsAnalyzer {
            config,
            inner: inner.with_name("news"),
        })
    }

    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    /// Normalized tokens in input order.
    pub fn tokens(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }

    /// Normalized text: surviving tokens joined by a single space.
    pub fn normalize(&self, text: &str) -> Result<String> {
        Ok(self.tokens(text)?.join(" "))
    }
}

impl Analyzer for NewsAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "news"
    }
}

/// Normalize `text` with a one-off [`NewsAnalyzer`].
///
/// None of the pipeline stages can fail, so an empty string is returned in
/// place of an error.
pub fn normalize(text: &str, min_token_length: usize) -> String {
    NewsAnalyzer::new(NormalizerConfig::new(min_token_length))
        .and_then(|analyzer| analyzer.normalize(text))
        .unwrap_or_default()
}
