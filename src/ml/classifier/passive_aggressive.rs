//! Passive-aggressive classifier (PA-I, hinge loss).

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Classifier, Label, validate_training_set};
use crate::error::Result;
use crate::ml::vector::SparseVector;

/// Hyper-parameters for [`PassiveAggressiveClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassiveAggressiveParams {
    /// Maximum step size (aggressiveness).
    pub c: f64,
    /// Maximum number of passes over the training data.
    pub max_iter: usize,
    /// Stop when the epoch loss improves by less than this.
    pub tol: f64,
    /// Epochs without sufficient improvement before stopping.
    pub n_iter_no_change: usize,
    /// Seed for per-epoch shuffling.
    pub seed: u64,
}

impl Default for PassiveAggressiveParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-3,
            n_iter_no_change: 5,
            seed: 42,
        }
    }
}

/// Margin-based online learner.
///
/// Each misclassified or low-margin sample moves the weights just far enough
/// to fix it, capped by `c`. The model has no probabilistic interpretation,
/// so it does not report confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveAggressiveClassifier {
    params: PassiveAggressiveParams,
    weights: Vec<f64>,
    bias: f64,
    epochs_run: usize,
}

impl PassiveAggressiveClassifier {
    pub fn new(params: PassiveAggressiveParams) -> Self {
        Self {
            params,
            weights: Vec::new(),
            bias: 0.0,
            epochs_run: 0,
        }
    }

    pub fn params(&self) -> &PassiveAggressiveParams {
        &self.params
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of epochs the last `fit` ran before stopping.
    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }
}

impl Default for PassiveAggressiveClassifier {
    fn default() -> Self {
        Self::new(PassiveAggressiveParams::default())
    }
}

impl Classifier for PassiveAggressiveClassifier {
    fn fit(&mut self, vectors: &[SparseVector], labels: &[Label]) -> Result<()> {
        let dimension = validate_training_set(vectors, labels)?;

        let mut weights = vec![0.0; dimension];
        let mut bias = 0.0;
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut order: Vec<usize> = (0..vectors.len()).collect();

        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut epochs_run = 0;

        for _ in 0..self.params.max_iter {
            order.shuffle(&mut rng);
            epochs_run += 1;

            let mut epoch_loss = 0.0;
            for &i in &order {
                let x = &vectors[i];
                let y = labels[i].sign();
                let margin = y * (x.dot(&weights) + bias);
                let loss = (1.0 - margin).max(0.0);
                if loss > 0.0 {
                    epoch_loss += loss;
                    // The bias acts as a constant feature of value 1.
                    let tau = (loss / (x.squared_norm() + 1.0)).min(self.params.c);
                    x.add_scaled_to(&mut weights, tau * y);
                    bias += tau * y;
                }
            }

            if epoch_loss == 0.0 {
                break;
            }
            if epoch_loss > best_loss - self.params.tol {
                no_improvement += 1;
                if no_improvement >= self.params.n_iter_no_change {
                    break;
                }
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(epoch_loss);
        }

        debug!(
            "Passive-aggressive fit: {} samples, {} features, {} epochs",
            vectors.len(),
            dimension,
            epochs_run
        );

        self.weights = weights;
        self.bias = bias;
        self.epochs_run = epochs_run;
        Ok(())
    }

    fn decision_function(&self, vector: &SparseVector) -> f64 {
        vector.dot(&self.weights) + self.bias
    }

    fn supports_confidence(&self) -> bool {
        false
    }

    fn predict_confidence(&self, _vector: &SparseVector) -> Option<f64> {
        None
    }

    fn dimension(&self) -> usize {
        self.weights.len()
    }

    fn name(&self) -> &'static str {
        "passive_aggressive"
    }
}
