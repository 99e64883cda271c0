//! Scripted claim checker for tests and offline runs.

use std::time::Duration;

use super::{ClaimChecker, ClaimReview};
use crate::error::{Result, VerityError};

#[derive(Debug, Clone)]
enum Behavior {
    Respond(Option<ClaimReview>),
    Fail(String),
    Stall(Duration),
}

/// Returns the same scripted outcome for every query.
#[derive(Debug, Clone)]
pub struct StaticClaimChecker {
    behavior: Behavior,
}

impl StaticClaimChecker {
    /// Always return `review`.
    pub fn responding(review: Option<ClaimReview>) -> Self {
        Self {
            behavior: Behavior::Respond(review),
        }
    }

    /// Always fail, as an unreachable service would.
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
        }
    }

    /// Sleep for `delay` before answering with no review.
    pub fn stalling(delay: Duration) -> Self {
        Self {
            behavior: Behavior::Stall(delay),
        }
    }
}

#[async_trait::async_trait]
impl ClaimChecker for StaticClaimChecker {
    async fn search(&self, _query: &str) -> Result<Option<ClaimReview>> {
        match &self.behavior {
            Behavior::Respond(review) => Ok(review.clone()),
            Behavior::Fail(message) => Err(VerityError::other(message.clone())),
            Behavior::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
