//! External fact-check lookups.
//!
//! A [`ClaimChecker`] searches published fact-checks for a query and returns
//! the best matching [`ClaimReview`]. Lookups are best-effort: callers treat
//! any error as "no fact-check available".

pub mod google;
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use google::GoogleFactCheckClient;
pub use mock::StaticClaimChecker;

/// Rating words that cancel an affirming term ("half true", "not correct").
const QUALIFYING_WORDS: &[&str] = &["not", "false", "half", "partly", "misleading"];

/// A published review of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReview {
    pub claim_text: String,
    /// Free-text verdict, e.g. "True", "Mostly False".
    pub textual_rating: String,
    pub publisher: Option<String>,
    pub review_url: Option<String>,
}

impl ClaimReview {
    pub fn new<S: Into<String>>(claim_text: S, textual_rating: S) -> Self {
        ClaimReview {
            claim_text: claim_text.into(),
            textual_rating: textual_rating.into(),
            publisher: None,
            review_url: None,
        }
    }

    /// Whether the rating confirms the claim.
    ///
    /// The rating must contain one of `affirming_terms` as a whole word and
    /// none of the qualifying words.
    pub fn is_affirming(&self, affirming_terms: &[String]) -> bool {
        let rating = self.textual_rating.to_lowercase();
        let words: Vec<&str> = rating
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let affirmed = affirming_terms
            .iter()
            .any(|term| words.contains(&term.to_lowercase().as_str()));
        let qualified = words.iter().any(|w| QUALIFYING_WORDS.contains(w));

        affirmed && !qualified
    }
}

/// Searches published fact-checks.
#[async_trait::async_trait]
pub trait ClaimChecker: Send + Sync {
    /// Best matching review for `query`, or `None` when nothing matched.
    async fn search(&self, query: &str) -> Result<Option<ClaimReview>>;

    /// Get the name of this checker for logging.
    fn name(&self) -> &str;
}

/// Checker used when no fact-check service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClaimChecker;

#[async_trait::async_trait]
impl ClaimChecker for NoopClaimChecker {
    async fn search(&self, _query: &str) -> Result<Option<ClaimReview>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "noop"
    }
}
