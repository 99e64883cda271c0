//! Logistic regression trained with stochastic gradient descent.

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Classifier, Label, validate_training_set};
use crate::error::Result;
use crate::ml::vector::SparseVector;

/// Hyper-parameters for [`LogisticRegressionClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    /// Initial learning rate.
    pub learning_rate: f64,
    /// L2 penalty strength (not applied to the bias).
    pub alpha: f64,
    /// Maximum number of passes over the training data.
    pub max_iter: usize,
    /// Stop when the mean epoch log-loss improves by less than this.
    pub tol: f64,
    /// Epochs without sufficient improvement before stopping.
    pub n_iter_no_change: usize,
    /// Seed for per-epoch shuffling.
    pub seed: u64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            alpha: 1e-5,
            max_iter: 1000,
            tol: 1e-4,
            n_iter_no_change: 5,
            seed: 42,
        }
    }
}

/// Probabilistic linear classifier.
///
/// `P(real | x) = sigmoid(w·x + b)`. Weights are stored as `scale * v` during
/// training so the L2 shrinkage step stays O(1) per sample on sparse input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    params: LogisticRegressionParams,
    weights: Vec<f64>,
    bias: f64,
    epochs_run: usize,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn log_loss(p: f64, y: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

impl LogisticRegressionClassifier {
    pub fn new(params: LogisticRegressionParams) -> Self {
        Self {
            params,
            weights: Vec::new(),
            bias: 0.0,
            epochs_run: 0,
        }
    }

    pub fn params(&self) -> &LogisticRegressionParams {
        &self.params
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    /// Probability that `vector` is real news.
    pub fn probability_real(&self, vector: &SparseVector) -> f64 {
        sigmoid(self.decision_function(vector))
    }
}

impl Default for LogisticRegressionClassifier {
    fn default() -> Self {
        Self::new(LogisticRegressionParams::default())
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, vectors: &[SparseVector], labels: &[Label]) -> Result<()> {
        let dimension = validate_training_set(vectors, labels)?;
        let params = self.params;

        let mut v = vec![0.0; dimension];
        let mut scale = 1.0;
        let mut bias = 0.0;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut order: Vec<usize> = (0..vectors.len()).collect();

        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut epochs_run = 0;

        for epoch in 0..params.max_iter {
            order.shuffle(&mut rng);
            epochs_run += 1;
            let lr = params.learning_rate / (1.0 + epoch as f64 * 0.1);

            let mut epoch_loss = 0.0;
            for &i in &order {
                let x = &vectors[i];
                let y = f64::from(labels[i].index());
                let p = sigmoid(scale * x.dot(&v) + bias);
                epoch_loss += log_loss(p, y);

                let gradient = p - y;
                scale *= 1.0 - lr * params.alpha;
                x.add_scaled_to(&mut v, -lr * gradient / scale);
                bias -= lr * gradient;

                if scale < 1e-9 {
                    for w in &mut v {
                        *w *= scale;
                    }
                    scale = 1.0;
                }
            }

            let mean_loss = epoch_loss / vectors.len() as f64;
            if mean_loss > best_loss - params.tol {
                no_improvement += 1;
                if no_improvement >= params.n_iter_no_change {
                    break;
                }
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(mean_loss);
        }

        for w in &mut v {
            *w *= scale;
        }

        debug!(
            "Logistic regression fit: {} samples, {} features, {} epochs, loss {:.4}",
            vectors.len(),
            dimension,
            epochs_run,
            best_loss
        );

        self.weights = v;
        self.bias = bias;
        self.epochs_run = epochs_run;
        Ok(())
    }

    fn decision_function(&self, vector: &SparseVector) -> f64 {
        vector.dot(&self.weights) + self.bias
    }

    fn supports_confidence(&self) -> bool {
        true
    }

    fn predict_confidence(&self, vector: &SparseVector) -> Option<f64> {
        let p_real = self.probability_real(vector);
        match self.predict(vector) {
            Label::Real => Some(p_real),
            Label::Fake => Some(1.0 - p_real),
        }
    }

    fn dimension(&self) -> usize {
        self.weights.len()
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}
