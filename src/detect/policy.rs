//! Decision policy: combine the classifier output with auxiliary signals.
//!
//! Overrides run in a fixed order (trusted domain, trusted keyword,
//! fact-check). Each one can only turn a FAKE label into REAL; the reason
//! recorded is that of the override that flipped it. Signals are recorded
//! whether or not they changed the label.

use log::info;
use url::Url;

use crate::config::DetectorConfig;
use crate::detect::trust::{TrustedDomains, TrustedKeywords};
use crate::detect::verdict::{FactCheckSignal, OverrideReason, Verdict};
use crate::factcheck::ClaimReview;
use crate::ml::classifier::Label;
use crate::ml::model::Prediction;

#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    domains: TrustedDomains,
    keywords: TrustedKeywords,
    affirming_terms: Vec<String>,
}

impl DecisionPolicy {
    pub fn new(
        domains: TrustedDomains,
        keywords: TrustedKeywords,
        affirming_terms: Vec<String>,
    ) -> Self {
        DecisionPolicy {
            domains,
            keywords,
            affirming_terms,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            TrustedDomains::new(&config.trusted_domains),
            TrustedKeywords::new(&config.trusted_keywords),
            config.affirming_terms.clone(),
        )
    }

    /// Baseline verdict plus the synchronous overrides.
    ///
    /// `source` is the article URL in URL mode.
    pub fn evaluate(&self, prediction: &Prediction, source: Option<&Url>) -> Verdict {
        let mut verdict = Verdict::from_prediction(prediction);
        if let Some(url) = source {
            self.apply_trusted_domain(&mut verdict, url);
        }
        self.apply_trusted_keyword(&mut verdict, &prediction.normalized_text);
        verdict
    }

    /// Full decision including an already-fetched fact-check result.
    pub fn decide(
        &self,
        prediction: &Prediction,
        source: Option<&Url>,
        review: Option<ClaimReview>,
    ) -> Verdict {
        let mut verdict = self.evaluate(prediction, source);
        self.apply_fact_check(&mut verdict, review);
        verdict
    }

    pub fn apply_trusted_domain(&self, verdict: &mut Verdict, url: &Url) {
        let Some(domain) = self.domains.match_url(url) else {
            return;
        };
        let signals = verdict.signals_mut();
        signals.trusted_domain = true;
        signals.matches.push(domain.to_string());

        if verdict.override_to_real(OverrideReason::TrustedDomain) {
            info!("Trusted domain override: {} matches {domain}", url.host_str().unwrap_or_default());
        }
    }

    pub fn apply_trusted_keyword(&self, verdict: &mut Verdict, normalized_text: &str) {
        let Some(keyword) = self.keywords.find_in(normalized_text) else {
            return;
        };
        let signals = verdict.signals_mut();
        signals.trusted_keyword = true;
        signals.matches.push(keyword.to_string());

        if verdict.override_to_real(OverrideReason::TrustedKeyword) {
            info!("Trusted keyword override: found {keyword:?}");
        }
    }

    pub fn apply_fact_check(&self, verdict: &mut Verdict, review: Option<ClaimReview>) {
        let Some(review) = review else {
            return;
        };
        let affirming = review.is_affirming(&self.affirming_terms);
        let rating = review.textual_rating.clone();
        verdict.signals_mut().fact_check = Some(FactCheckSignal { review, affirming });

        if affirming && verdict.override_to_real(OverrideReason::FactCheck) {
            info!("Fact-check override: rated {rating:?}");
        }
    }

    /// Whether a fact-check lookup could still change `verdict`.
    pub fn wants_fact_check(&self, verdict: &Verdict) -> bool {
        verdict.label() == Label::Fake
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: Label, normalized_text: &str) -> Prediction {
        Prediction {
            label,
            confidence: Some(0.9),
            score: if label == Label::Real { 1.0 } else { -1.0 },
            normalized_text: normalized_text.to_string(),
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_baseline_kept() {
        let policy = DecisionPolicy::default();
        let verdict = policy.decide(&prediction(Label::Fake, "aliens control government"), None, None);
        assert_eq!(verdict.label(), Label::Fake);
        assert_eq!(verdict.reason(), OverrideReason::ModelPrediction);
        assert_eq!(verdict.confidence(), Some(0.9));
    }

    #[test]
    fn test_trusted_domain_override() {
        let policy = DecisionPolicy::default();
        let source = url("https://www.ndtv.com/india-news/some-story");
        let verdict = policy.decide(&prediction(Label::Fake, "story text"), Some(&source), None);
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.reason(), OverrideReason::TrustedDomain);
        assert!(verdict.signals().trusted_domain);
        assert_eq!(verdict.model_label(), Label::Fake);
    }

    #[test]
    fn test_lookalike_domain_not_trusted() {
        let policy = DecisionPolicy::default();
        let source = url("https://fakendtv.com.evil.net/story");
        let verdict = policy.decide(&prediction(Label::Fake, "story text"), Some(&source), None);
        assert_eq!(verdict.label(), Label::Fake);
        assert!(!verdict.signals().trusted_domain);
    }

    #[test]
    fn test_trusted_keyword_override() {
        let policy = DecisionPolicy::default();
        let verdict = policy.decide(
            &prediction(Label::Fake, "president announced new award isro scientists today"),
            None,
            None,
        );
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.reason(), OverrideReason::TrustedKeyword);
    }

    #[test]
    fn test_first_override_reason_wins() {
        let policy = DecisionPolicy::default();
        let source = url("https://bbc.com/news/1");
        let verdict = policy.decide(
            &prediction(Label::Fake, "nasa launches probe"),
            Some(&source),
            Some(ClaimReview::new("claim", "True")),
        );
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.reason(), OverrideReason::TrustedDomain);
        assert!(verdict.signals().trusted_keyword);
        assert!(verdict.signals().fact_check.as_ref().unwrap().affirming);
    }

    #[test]
    fn test_fact_check_override() {
        let policy = DecisionPolicy::default();
        let verdict = policy.decide(
            &prediction(Label::Fake, "vaccine claim"),
            None,
            Some(ClaimReview::new("claim", "Correct")),
        );
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.reason(), OverrideReason::FactCheck);

        let verdict = policy.decide(
            &prediction(Label::Fake, "vaccine claim"),
            None,
            Some(ClaimReview::new("claim", "False")),
        );
        assert_eq!(verdict.label(), Label::Fake);
        assert!(!verdict.signals().fact_check.as_ref().unwrap().affirming);
    }

    #[test]
    fn test_real_never_downgraded() {
        let policy = DecisionPolicy::default();
        let verdict = policy.decide(
            &prediction(Label::Real, "parliament passes budget"),
            Some(&url("https://evil.example/story")),
            Some(ClaimReview::new("claim", "False")),
        );
        assert_eq!(verdict.label(), Label::Real);
        assert_eq!(verdict.reason(), OverrideReason::ModelPrediction);
        assert!(!policy.wants_fact_check(&verdict));
    }
}
