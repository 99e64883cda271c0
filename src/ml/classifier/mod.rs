//! Linear binary classifiers over TF-IDF features.
//!
//! Two families are available:
//!
//! - [`PassiveAggressiveClassifier`]: margin-based online learner, no calibrated
//!   probabilities.
//! - [`LogisticRegressionClassifier`]: probabilistic linear model.
//!
//! Callers check [`Classifier::supports_confidence`] once instead of probing
//! for a probability and recovering from failure.

mod logistic;
mod passive_aggressive;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::ml::vector::SparseVector;

pub use logistic::{LogisticRegressionClassifier, LogisticRegressionParams};
pub use passive_aggressive::{PassiveAggressiveClassifier, PassiveAggressiveParams};

/// Binary news label. The numeric convention (0 = fake, 1 = real) is fixed
/// at training time and checked again when a model is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Fake = 0,
    Real = 1,
}

impl Label {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Label::Fake),
            1 => Ok(Label::Real),
            other => Err(VerityError::model(format!("Unknown label index: {other}"))),
        }
    }

    /// `+1.0` for real, `-1.0` for fake.
    pub(crate) fn sign(self) -> f64 {
        match self {
            Label::Fake => -1.0,
            Label::Real => 1.0,
        }
    }

    pub(crate) fn from_score(score: f64) -> Self {
        if score > 0.0 { Label::Real } else { Label::Fake }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Fake => write!(f, "FAKE"),
            Label::Real => write!(f, "REAL"),
        }
    }
}

/// Label convention persisted with a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConvention {
    pub fake: u8,
    pub real: u8,
}

impl LabelConvention {
    /// The only convention this crate trains and serves with.
    pub const STANDARD: LabelConvention = LabelConvention { fake: 0, real: 1 };
}

impl Default for LabelConvention {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Linear binary classifier trait.
pub trait Classifier: Send + Sync {
    /// Train on feature vectors and their labels.
    fn fit(&mut self, vectors: &[SparseVector], labels: &[Label]) -> Result<()>;

    /// Signed distance to the decision boundary; positive means real.
    fn decision_function(&self, vector: &SparseVector) -> f64;

    /// Predict the label for a feature vector.
    fn predict(&self, vector: &SparseVector) -> Label {
        Label::from_score(self.decision_function(vector))
    }

    /// Whether [`predict_confidence`](Self::predict_confidence) yields a value.
    fn supports_confidence(&self) -> bool;

    /// Probability of the predicted label, in `[0, 1]`.
    fn predict_confidence(&self, vector: &SparseVector) -> Option<f64>;

    /// Feature dimension the weights were fitted for.
    fn dimension(&self) -> usize;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Classifier family selectable at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierFamily {
    #[default]
    PassiveAggressive,
    Logistic,
}

impl fmt::Display for ClassifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierFamily::PassiveAggressive => write!(f, "passive-aggressive"),
            ClassifierFamily::Logistic => write!(f, "logistic"),
        }
    }
}

impl FromStr for ClassifierFamily {
    type Err = VerityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "passive-aggressive" | "pa" => Ok(ClassifierFamily::PassiveAggressive),
            "logistic" | "lr" => Ok(ClassifierFamily::Logistic),
            other => Err(VerityError::config(format!(
                "Unknown classifier family: {other}"
            ))),
        }
    }
}

/// A fitted classifier of either family, as persisted in an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LinearModel {
    PassiveAggressive(PassiveAggressiveClassifier),
    Logistic(LogisticRegressionClassifier),
}

impl LinearModel {
    /// Unfitted model of the requested family.
    pub fn new(family: ClassifierFamily, seed: u64, max_iter: usize) -> Self {
        match family {
            ClassifierFamily::PassiveAggressive => {
                LinearModel::PassiveAggressive(PassiveAggressiveClassifier::new(
                    PassiveAggressiveParams {
                        seed,
                        max_iter,
                        ..Default::default()
                    },
                ))
            }
            ClassifierFamily::Logistic => {
                LinearModel::Logistic(LogisticRegressionClassifier::new(
                    LogisticRegressionParams {
                        seed,
                        max_iter,
                        ..Default::default()
                    },
                ))
            }
        }
    }

    pub fn family(&self) -> ClassifierFamily {
        match self {
            LinearModel::PassiveAggressive(_) => ClassifierFamily::PassiveAggressive,
            LinearModel::Logistic(_) => ClassifierFamily::Logistic,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            LinearModel::PassiveAggressive(c) => c,
            LinearModel::Logistic(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            LinearModel::PassiveAggressive(c) => c,
            LinearModel::Logistic(c) => c,
        }
    }

    pub fn weights(&self) -> &[f64] {
        match self {
            LinearModel::PassiveAggressive(c) => c.weights(),
            LinearModel::Logistic(c) => c.weights(),
        }
    }

    pub fn bias(&self) -> f64 {
        match self {
            LinearModel::PassiveAggressive(c) => c.bias(),
            LinearModel::Logistic(c) => c.bias(),
        }
    }
}

impl Classifier for LinearModel {
    fn fit(&mut self, vectors: &[SparseVector], labels: &[Label]) -> Result<()> {
        self.inner_mut().fit(vectors, labels)
    }

    fn decision_function(&self, vector: &SparseVector) -> f64 {
        self.inner().decision_function(vector)
    }

    fn supports_confidence(&self) -> bool {
        self.inner().supports_confidence()
    }

    fn predict_confidence(&self, vector: &SparseVector) -> Option<f64> {
        self.inner().predict_confidence(vector)
    }

    fn dimension(&self) -> usize {
        self.inner().dimension()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

/// Shared input checks for `fit` implementations. Returns the dimension.
pub(crate) fn validate_training_set(vectors: &[SparseVector], labels: &[Label]) -> Result<usize> {
    if vectors.is_empty() {
        return Err(VerityError::training("Training set cannot be empty"));
    }
    if vectors.len() != labels.len() {
        return Err(VerityError::training(format!(
            "Got {} vectors but {} labels",
            vectors.len(),
            labels.len()
        )));
    }

    let dimension = vectors[0].dimension();
    if let Some(bad) = vectors.iter().find(|v| v.dimension() != dimension) {
        return Err(VerityError::training(format!(
            "Inconsistent feature dimension: expected {dimension}, got {}",
            bad.dimension()
        )));
    }

    if !labels.contains(&Label::Fake) || !labels.contains(&Label::Real) {
        log::warn!("Training set contains a single class; the model will be degenerate");
    }

    Ok(dimension)
}
