//! Verdict types returned by the detector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::factcheck::ClaimReview;
use crate::ml::classifier::Label;
use crate::ml::model::Prediction;

/// Why the final label was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideReason {
    #[serde(rename = "model prediction")]
    ModelPrediction,
    #[serde(rename = "trusted domain override")]
    TrustedDomain,
    #[serde(rename = "trusted keyword override")]
    TrustedKeyword,
    #[serde(rename = "fact-check override")]
    FactCheck,
}

impl OverrideReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideReason::ModelPrediction => "model prediction",
            OverrideReason::TrustedDomain => "trusted domain override",
            OverrideReason::TrustedKeyword => "trusted keyword override",
            OverrideReason::FactCheck => "fact-check override",
        }
    }
}

impl fmt::Display for OverrideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact-check result and whether it confirmed the claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckSignal {
    pub review: ClaimReview,
    pub affirming: bool,
}

/// Auxiliary signals consulted while deciding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSignals {
    /// The source URL's host is on the trusted list.
    pub trusted_domain: bool,
    /// The normalized text contains a trusted keyword.
    pub trusted_keyword: bool,
    /// Matched trusted domain or keyword, for display.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check: Option<FactCheckSignal>,
}

/// Final decision for one request.
///
/// The label only ever moves from FAKE to REAL after the baseline
/// prediction; there is no way to set it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    label: Label,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    reason: OverrideReason,
    model_label: Label,
    signals: SourceSignals,
}

impl Verdict {
    /// Verdict carrying the classifier's own decision.
    pub fn from_prediction(prediction: &Prediction) -> Self {
        Verdict {
            label: prediction.label,
            confidence: prediction.confidence,
            reason: OverrideReason::ModelPrediction,
            model_label: prediction.label,
            signals: SourceSignals::default(),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    /// Classifier confidence in its own label; absent for margin-based models.
    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn reason(&self) -> OverrideReason {
        self.reason
    }

    /// Label before any override.
    pub fn model_label(&self) -> Label {
        self.model_label
    }

    pub fn signals(&self) -> &SourceSignals {
        &self.signals
    }

    pub fn is_overridden(&self) -> bool {
        self.reason != OverrideReason::ModelPrediction
    }

    pub(crate) fn signals_mut(&mut self) -> &mut SourceSignals {
        &mut self.signals
    }

    /// Flip a FAKE verdict to REAL. Returns whether the label changed.
    pub(crate) fn override_to_real(&mut self, reason: OverrideReason) -> bool {
        if self.label == Label::Real {
            return false;
        }
        self.label = Label::Real;
        self.reason = reason;
        true
    }
}

/// Title and excerpt of a fetched article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub excerpt: String,
}

impl ExtractedArticle {
    /// Keep the first `max_chars` characters of `text`, marking truncation with `...`.
    pub fn new(title: &str, text: &str, max_chars: usize) -> Self {
        let excerpt = match text.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", text[..end].trim_end()),
            None => text.to_string(),
        };
        ExtractedArticle {
            title: title.to_string(),
            excerpt,
        }
    }
}
