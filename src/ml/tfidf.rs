//! TF-IDF vectorizer for text feature extraction.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::NormalizerConfig;
use crate::error::{Result, VerityError};
use crate::ml::vector::SparseVector;

/// Default cap on the vocabulary size.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// TF-IDF vectorizer over normalized text.
///
/// Input documents are expected to be the output of
/// [`NewsAnalyzer::normalize`](crate::analysis::analyzer::NewsAnalyzer::normalize):
/// tokens separated by whitespace. The vocabulary and IDF weights are frozen
/// by [`fit`](Self::fit); [`transform`](Self::transform) never changes them.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> column index.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each column.
    idf: Vec<f64>,
    /// Total number of documents seen during training.
    n_documents: usize,
    /// Keep at most this many terms, ranked by corpus frequency.
    max_features: Option<usize>,
    /// Ignore terms appearing in more than this fraction of documents.
    max_df: f64,
    /// Ignore terms appearing in fewer than this many documents.
    min_df: usize,
    /// Normalization the fitted documents went through.
    normalizer: NormalizerConfig,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("max_features", &self.max_features)
            .field("max_df", &self.max_df)
            .field("min_df", &self.min_df)
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer with default parameters.
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            max_features: Some(DEFAULT_MAX_FEATURES),
            max_df: 1.0,
            min_df: 1,
            normalizer: NormalizerConfig::default(),
        }
    }

    /// Cap the vocabulary size. `None` keeps every term.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Ignore terms appearing in more than `max_df` (a fraction) of the documents.
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    /// Ignore terms appearing in fewer than `min_df` documents.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Record the normalization settings the input documents were produced with.
    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Fit the vectorizer on normalized training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(VerityError::training(
                "Cannot fit vectorizer on an empty corpus",
            ));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(VerityError::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(VerityError::config("max_features must be positive"));
        }

        let n_documents = documents.len();
        let mut term_frequency: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();

        for doc in documents {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in doc.split_whitespace() {
                *term_frequency.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *document_frequency.entry(token).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = self.max_df * n_documents as f64;
        let mut candidates: Vec<(&str, usize)> = term_frequency
            .into_iter()
            .filter(|(term, _)| {
                let df = document_frequency.get(term).copied().unwrap_or(0);
                df >= self.min_df && df as f64 <= max_doc_count
            })
            .collect();

        // Most frequent first, ties broken lexicographically.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(max_features) = self.max_features {
            candidates.truncate(max_features);
        }

        if candidates.is_empty() {
            return Err(VerityError::training(
                "Empty vocabulary: every document is empty after normalization or all terms were pruned",
            ));
        }

        // Column indices follow lexicographic term order.
        let mut terms: Vec<&str> = candidates.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (idx, term) in terms.into_iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0);
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term.to_string(), idx);
        }

        debug!(
            "Fitted TF-IDF vocabulary of {} terms over {} documents",
            vocabulary.len(),
            n_documents
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a normalized document into an L2-normalized TF-IDF vector.
    ///
    /// Out-of-vocabulary tokens contribute nothing; a document with no known
    /// terms maps to the zero vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(VerityError::model("TF-IDF vectorizer is not fitted"));
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in document.split_whitespace() {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        let mut vector = SparseVector::from_pairs(self.dimension(), pairs);
        vector.normalize();

        Ok(vector)
    }

    /// Fit on `documents` and return their vectors.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty() && self.vocabulary.len() == self.idf.len()
    }

    /// Get the size of the vocabulary, i.e. the feature dimension.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Feature dimension `D`.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn normalizer(&self) -> NormalizerConfig {
        self.normalizer
    }

    /// Column index of `term`, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "government announces budget".to_string(),
            "aliens control government".to_string(),
            "budget passes parliament".to_string(),
        ]
    }

    #[test]
    fn test_tfidf_vectorizer() {
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&corpus()).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 7);

        let features = vectorizer.transform("government budget").unwrap();
        assert_eq!(features.dimension(), vectorizer.vocabulary_size());
        assert_eq!(features.nnz(), 2);
        assert!((features.l2_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lexicographic_columns() {
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&corpus()).unwrap();
        assert_eq!(vectorizer.index_of("aliens"), Some(0));
        assert_eq!(vectorizer.index_of("parliament"), Some(5));
    }

    #[test]
    fn test_idf_rewards_rare_terms() {
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&corpus()).unwrap();
        let rare = vectorizer.idf()[vectorizer.index_of("aliens").unwrap()];
        let common = vectorizer.idf()[vectorizer.index_of("government").unwrap()];
        assert!(rare > common);
        // ln(4/2) + 1
        assert!((common - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vectorizer = TfIdfVectorizer::new().with_max_features(Some(2));
        vectorizer.fit(&corpus()).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 2);
        assert!(vectorizer.index_of("government").is_some());
        assert!(vectorizer.index_of("budget").is_some());
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        let docs = vec![
            "news alpha".to_string(),
            "news beta".to_string(),
            "news gamma".to_string(),
        ];
        let mut vectorizer = TfIdfVectorizer::new().with_max_df(0.5);
        vectorizer.fit(&docs).unwrap();
        assert!(vectorizer.index_of("news").is_none());
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero_vector() {
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&corpus()).unwrap();
        let features = vectorizer.transform("xyz qqq zzz").unwrap();
        assert!(features.is_zero());
        assert_eq!(features.dimension(), 7);
        assert!(vectorizer.transform("").unwrap().is_zero());
    }

    #[test]
    fn test_transform_is_deterministic() {
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&corpus()).unwrap();
        let a = vectorizer.transform("budget budget government aliens").unwrap();
        let b = vectorizer.transform("budget budget government aliens").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_errors() {
        let mut vectorizer = TfIdfVectorizer::new();
        assert!(vectorizer.fit(&[]).is_err());
        assert!(vectorizer.fit(&["".to_string(), " ".to_string()]).is_err());
        assert!(TfIdfVectorizer::new().transform("budget").is_err());

        let mut bad = TfIdfVectorizer::new().with_max_df(0.0);
        assert!(bad.fit(&corpus()).is_err());
    }
}
