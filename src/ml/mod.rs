//! Machine learning components of the news classifier.
//!
//! This module provides TF-IDF feature extraction, linear binary classifiers,
//! the persisted model artifacts and the offline training pipeline.

pub mod artifact;
pub mod classifier;
pub mod model;
pub mod tfidf;
pub mod training;
pub mod vector;

pub use classifier::{Classifier, ClassifierFamily, Label, LinearModel};
pub use model::{ModelHandle, NewsModel, Prediction};
pub use tfidf::TfIdfVectorizer;
pub use training::{TrainingOptions, TrainingPipeline, TrainingReport};
pub use vector::SparseVector;
