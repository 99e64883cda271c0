//! The fitted inference model and its shared handle.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::NewsAnalyzer;
use crate::error::{Result, VerityError};
use crate::ml::artifact::{
    self, ArtifactPaths, CLASSIFIER_MAGIC, ClassifierArtifact, ModelManifest, VECTORIZER_MAGIC,
};
use crate::ml::classifier::{Classifier, Label, LabelConvention, LinearModel};
use crate::ml::tfidf::TfIdfVectorizer;

/// Output of [`NewsModel::classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of `label`; absent when the classifier family has none.
    pub confidence: Option<f64>,
    /// Raw decision score (positive means real).
    pub score: f64,
    /// The normalized text that was vectorized.
    pub normalized_text: String,
}

/// Analyzer, vectorizer and classifier bundled together.
///
/// Immutable once built. The analyzer is rebuilt from the normalization
/// settings stored in the vectorizer, so inference always normalizes text the
/// same way the training corpus was normalized.
#[derive(Debug)]
pub struct NewsModel {
    analyzer: NewsAnalyzer,
    vectorizer: TfIdfVectorizer,
    classifier: LinearModel,
    manifest: Option<ModelManifest>,
}

impl NewsModel {
    /// Bundle fitted components, checking that they agree on the feature dimension.
    pub fn new(vectorizer: TfIdfVectorizer, classifier: LinearModel) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(VerityError::model("Vectorizer is not fitted"));
        }
        if vectorizer.dimension() != classifier.dimension() {
            return Err(VerityError::model(format!(
                "Dimension mismatch: vectorizer has {} features, classifier has {} weights",
                vectorizer.dimension(),
                classifier.dimension()
            )));
        }

        Ok(NewsModel {
            analyzer: NewsAnalyzer::new(vectorizer.normalizer())?,
            vectorizer,
            classifier,
            manifest: None,
        })
    }

    pub fn with_manifest(mut self, manifest: ModelManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Load a model directory written by [`save`](Self::save).
    ///
    /// A missing or unreadable artifact is an error; the manifest is optional.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let paths = ArtifactPaths::in_dir(dir.as_ref());

        let vectorizer: TfIdfVectorizer = artifact::read_artifact(&paths.vectorizer, VECTORIZER_MAGIC)?;
        let classifier: ClassifierArtifact =
            artifact::read_artifact(&paths.classifier, CLASSIFIER_MAGIC)?;

        if classifier.convention != LabelConvention::STANDARD {
            return Err(VerityError::artifact(format!(
                "Label convention mismatch: artifact uses fake={} real={}, expected fake={} real={}",
                classifier.convention.fake,
                classifier.convention.real,
                LabelConvention::STANDARD.fake,
                LabelConvention::STANDARD.real
            )));
        }

        let mut model = Self::new(vectorizer, classifier.model)?;

        if paths.manifest.exists() {
            match artifact::read_manifest(&paths.manifest) {
                Ok(manifest) => model.manifest = Some(manifest),
                Err(e) => warn!("Ignoring unreadable manifest {}: {e}", paths.manifest.display()),
            }
        }

        info!(
            "Loaded model from {}: {} features, {} classifier, min_token_length {}",
            dir.as_ref().display(),
            model.dimension(),
            model.classifier.name(),
            model.analyzer.config().min_token_length
        );

        Ok(model)
    }

    /// Write all artifacts into `dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let paths = ArtifactPaths::in_dir(dir);

        artifact::write_artifact(&paths.vectorizer, VECTORIZER_MAGIC, &self.vectorizer)?;
        artifact::write_artifact(
            &paths.classifier,
            CLASSIFIER_MAGIC,
            &ClassifierArtifact {
                convention: LabelConvention::STANDARD,
                model: self.classifier.clone(),
            },
        )?;
        if let Some(manifest) = &self.manifest {
            artifact::write_manifest(&paths.manifest, manifest)?;
        }

        info!("Saved model to {}", dir.display());
        Ok(())
    }

    /// Normalize, vectorize and classify raw text.
    ///
    /// Text with no in-vocabulary terms maps to the zero vector and still
    /// gets a label.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        let normalized_text = self.analyzer.normalize(text)?;
        let vector = self.vectorizer.transform(&normalized_text)?;

        let score = self.classifier.decision_function(&vector);
        let confidence = if self.classifier.supports_confidence() {
            self.classifier.predict_confidence(&vector)
        } else {
            None
        };

        Ok(Prediction {
            label: Label::from_score(score),
            confidence,
            score,
            normalized_text,
        })
    }

    /// Normalize text exactly as the model does before vectorizing.
    pub fn normalize(&self, text: &str) -> Result<String> {
        self.analyzer.normalize(text)
    }

    pub fn analyzer(&self) -> &NewsAnalyzer {
        &self.analyzer
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LinearModel {
        &self.classifier
    }

    pub fn manifest(&self) -> Option<&ModelManifest> {
        self.manifest.as_ref()
    }

    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn supports_confidence(&self) -> bool {
        self.classifier.supports_confidence()
    }
}

/// Shared, swappable reference to the current model.
///
/// Readers take a cheap `Arc` clone and keep using it for the whole request,
/// so [`replace`](Self::replace) never affects a request already in flight.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    current: Arc<RwLock<Arc<NewsModel>>>,
}

impl ModelHandle {
    pub fn new(model: NewsModel) -> Self {
        ModelHandle {
            current: Arc::new(RwLock::new(Arc::new(model))),
        }
    }

    pub fn current(&self) -> Arc<NewsModel> {
        Arc::clone(&self.current.read())
    }

    /// Install a freshly trained model; returns the previous one.
    pub fn replace(&self, model: NewsModel) -> Arc<NewsModel> {
        let mut guard = self.current.write();
        std::mem::replace(&mut *guard, Arc::new(model))
    }
}
