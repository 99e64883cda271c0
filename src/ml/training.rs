//! Offline training pipeline.
//!
//! Loads a fake and a real corpus, shuffles them together, normalizes every
//! document, fits the vectorizer and classifier on the training split and
//! evaluates on the held-out split.
//!
//! ```text
//! Fake.csv ─┐
//!           ├─> shuffle ─> normalize ─> split ─> fit ─> evaluate ─> persist
//! True.csv ─┘
//! ```

use std::fmt;
use std::path::Path;

use chrono::Utc;
use csv::ReaderBuilder;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::analyzer::{NewsAnalyzer, NormalizerConfig};
use crate::error::{Result, VerityError};
use crate::ml::artifact::{FORMAT_VERSION, ModelManifest};
use crate::ml::classifier::{Classifier, ClassifierFamily, Label, LinearModel};
use crate::ml::model::NewsModel;
use crate::ml::tfidf::{DEFAULT_MAX_FEATURES, TfIdfVectorizer};

/// One labeled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDocument {
    pub title: Option<String>,
    pub text: String,
    pub label: Label,
}

impl LabeledDocument {
    pub fn new<S: Into<String>>(text: S, label: Label) -> Self {
        LabeledDocument {
            title: None,
            text: text.into(),
            label,
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The text fed to the normalizer.
    fn content(&self, include_title: bool) -> String {
        match (&self.title, include_title) {
            (Some(title), true) if !title.is_empty() => format!("{title} {}", self.text),
            _ => self.text.clone(),
        }
    }
}

/// Training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Seed for shuffling, splitting and classifier updates. A random seed is
    /// drawn (and recorded in the report) when unset.
    pub seed: Option<u64>,
    /// Fraction of the corpus held out for evaluation.
    pub test_fraction: f64,
    /// Prepend the title column to the body text.
    pub include_title: bool,
    /// Minimum token length for the normalizer; 0 keeps every token.
    pub min_token_length: usize,
    pub max_features: Option<usize>,
    pub max_df: f64,
    pub family: ClassifierFamily,
    pub max_iter: usize,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            seed: None,
            test_fraction: 0.2,
            include_title: false,
            min_token_length: 0,
            max_features: Some(DEFAULT_MAX_FEATURES),
            max_df: 1.0,
            family: ClassifierFamily::default(),
            max_iter: 1000,
        }
    }
}

impl TrainingOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(VerityError::config(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.max_iter == 0 {
            return Err(VerityError::config("max_iter must be positive"));
        }
        Ok(())
    }
}

/// Binary confusion matrix with REAL as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_real: usize,
    pub false_real: usize,
    pub true_fake: usize,
    pub false_fake: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        match (actual, predicted) {
            (Label::Real, Label::Real) => self.true_real += 1,
            (Label::Fake, Label::Real) => self.false_real += 1,
            (Label::Fake, Label::Fake) => self.true_fake += 1,
            (Label::Real, Label::Fake) => self.false_fake += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_real + self.false_real + self.true_fake + self.false_fake
    }
}

/// Held-out evaluation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl EvaluationMetrics {
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let accuracy = ratio(confusion.true_real + confusion.true_fake, confusion.total());
        let precision = ratio(confusion.true_real, confusion.true_real + confusion.false_real);
        let recall = ratio(confusion.true_real, confusion.true_real + confusion.false_fake);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        EvaluationMetrics {
            accuracy,
            precision,
            recall,
            f1,
            confusion,
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
            self.accuracy, self.precision, self.recall, self.f1
        )
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_id: Uuid,
    pub seed: u64,
    pub family: ClassifierFamily,
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    /// Absent when the held-out split is empty.
    pub metrics: Option<EvaluationMetrics>,
}

/// Read one labeled corpus from a CSV file with a `text` column and an
/// optional `title` column.
pub fn load_corpus<P: AsRef<Path>>(path: P, label: Label) -> Result<Vec<LabeledDocument>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(VerityError::training(format!(
            "Corpus file not found: {}",
            path.display()
        )));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let text_idx = column("text").ok_or_else(|| {
        VerityError::training(format!("{} has no `text` column", path.display()))
    })?;
    let title_idx = column("title");

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record?;
        let text = record.get(text_idx).unwrap_or_default().to_string();
        let title = title_idx
            .and_then(|idx| record.get(idx))
            .map(str::to_string);
        documents.push(LabeledDocument { title, text, label });
    }

    if documents.is_empty() {
        return Err(VerityError::training(format!(
            "Corpus {} contains no rows",
            path.display()
        )));
    }

    info!("Loaded {} {} documents from {}", documents.len(), label, path.display());
    Ok(documents)
}

/// Trains a [`NewsModel`] from labeled documents.
#[derive(Debug, Clone, Default)]
pub struct TrainingPipeline {
    options: TrainingOptions,
}

impl TrainingPipeline {
    pub fn new(options: TrainingOptions) -> Result<Self> {
        options.validate()?;
        Ok(TrainingPipeline { options })
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Load both corpora, train, and write the model into `out_dir`.
    pub fn run<P: AsRef<Path>>(
        &self,
        fake_path: P,
        real_path: P,
        out_dir: P,
    ) -> Result<TrainingReport> {
        let mut documents = load_corpus(fake_path, Label::Fake)?;
        documents.extend(load_corpus(real_path, Label::Real)?);

        let (model, report) = self.train(documents)?;
        model.save(out_dir)?;
        Ok(report)
    }

    /// Train on in-memory documents.
    pub fn train(&self, mut documents: Vec<LabeledDocument>) -> Result<(NewsModel, TrainingReport)> {
        if documents.is_empty() {
            return Err(VerityError::training("No training documents"));
        }

        let options = &self.options;
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        documents.shuffle(&mut rng);

        let normalizer = NormalizerConfig::new(options.min_token_length);
        let analyzer = NewsAnalyzer::new(normalizer)?;
        let normalized: Vec<String> = documents
            .par_iter()
            .map(|doc| analyzer.normalize(&doc.content(options.include_title)))
            .collect::<Result<Vec<_>>>()?;
        let labels: Vec<Label> = documents.iter().map(|doc| doc.label).collect();

        let n_test = held_out_size(documents.len(), options.test_fraction);
        let n_train = documents.len() - n_test;
        let (train_docs, test_docs) = normalized.split_at(n_train);
        let (train_labels, test_labels) = labels.split_at(n_train);
        debug!("Split corpus into {n_train} training and {n_test} held-out documents");

        let mut vectorizer = TfIdfVectorizer::new()
            .with_max_features(options.max_features)
            .with_max_df(options.max_df)
            .with_normalizer(normalizer);
        let train_vectors = vectorizer.fit_transform(train_docs)?;

        let mut classifier = LinearModel::new(options.family, seed, options.max_iter);
        classifier.fit(&train_vectors, train_labels)?;

        let metrics = if test_docs.is_empty() {
            None
        } else {
            let mut confusion = ConfusionMatrix::default();
            for (doc, &actual) in test_docs.iter().zip(test_labels) {
                let vector = vectorizer.transform(doc)?;
                confusion.record(actual, classifier.predict(&vector));
            }
            Some(EvaluationMetrics::from_confusion(confusion))
        };

        match &metrics {
            Some(metrics) => info!("Held-out evaluation: {metrics}"),
            None => info!("No held-out split; skipping evaluation"),
        }

        let manifest = ModelManifest {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            family: options.family,
            vocabulary_size: vectorizer.vocabulary_size(),
            min_token_length: options.min_token_length,
            training_documents: n_train,
            seed: Some(seed),
            metrics: metrics.clone(),
            format_version: FORMAT_VERSION,
        };
        let report = TrainingReport {
            model_id: manifest.model_id,
            seed,
            family: options.family,
            train_size: n_train,
            test_size: n_test,
            vocabulary_size: vectorizer.vocabulary_size(),
            metrics,
        };

        let model = NewsModel::new(vectorizer, classifier)?.with_manifest(manifest);
        Ok((model, report))
    }
}

/// Number of held-out documents, always leaving at least one for training.
fn held_out_size(total: usize, test_fraction: f64) -> usize {
    let n_test = (total as f64 * test_fraction).round() as usize;
    n_test.min(total.saturating_sub(1))
}
