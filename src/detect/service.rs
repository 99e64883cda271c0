//! The inference entry point.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::DetectorConfig;
use crate::detect::policy::DecisionPolicy;
use crate::detect::verdict::{ExtractedArticle, Verdict};
use crate::error::{Result, VerityError};
use crate::factcheck::{ClaimChecker, ClaimReview, GoogleFactCheckClient, NoopClaimChecker};
use crate::fetch::{Article, ArticleFetcher, FetchError, FetchErrorKind, HttpArticleFetcher};
use crate::ml::model::ModelHandle;

/// Fact-check queries are cut to this many characters.
const MAX_QUERY_CHARS: usize = 200;

/// Message shown when pasted text is too short to classify.
pub const SHORT_INPUT_MESSAGE: &str = "Please enter a longer news statement.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckMode {
    Text,
    Url,
}

/// One classification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub mode: CheckMode,
    pub content: String,
}

impl CheckRequest {
    pub fn text<S: Into<String>>(content: S) -> Self {
        CheckRequest {
            mode: CheckMode::Text,
            content: content.into(),
        }
    }

    pub fn url<S: Into<String>>(content: S) -> Self {
        CheckRequest {
            mode: CheckMode::Url,
            content: content.into(),
        }
    }
}

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input too short or empty.
    Validation,
    Network,
    Parse,
    EmptyContent,
    Forbidden,
    Timeout,
    /// Unexpected failure inside the model.
    Internal,
}

impl ErrorKind {
    /// Whether the error came from article extraction.
    pub fn is_extraction(&self) -> bool {
        !matches!(self, ErrorKind::Validation | ErrorKind::Internal)
    }
}

impl From<FetchErrorKind> for ErrorKind {
    fn from(kind: FetchErrorKind) -> Self {
        match kind {
            FetchErrorKind::Network => ErrorKind::Network,
            FetchErrorKind::Parse => ErrorKind::Parse,
            FetchErrorKind::EmptyContent => ErrorKind::EmptyContent,
            FetchErrorKind::Forbidden => ErrorKind::Forbidden,
            FetchErrorKind::Timeout => ErrorKind::Timeout,
        }
    }
}

/// Result of a request, serialized with a `status` of `OK` or `ERROR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum CheckResponse {
    Ok {
        verdict: Verdict,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extracted: Option<ExtractedArticle>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl CheckResponse {
    fn error<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        CheckResponse::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResponse::Ok { .. })
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            CheckResponse::Ok { verdict, .. } => Some(verdict),
            CheckResponse::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            CheckResponse::Ok { .. } => None,
            CheckResponse::Error { kind, .. } => Some(*kind),
        }
    }
}

impl From<FetchError> for CheckResponse {
    fn from(err: FetchError) -> Self {
        CheckResponse::error(err.kind.into(), err.message)
    }
}

/// Classifies news text or articles.
///
/// Holds the model handle and the external collaborators; every request
/// reads the model through [`ModelHandle::current`] and never mutates it.
pub struct DetectorService {
    model: ModelHandle,
    policy: DecisionPolicy,
    fetcher: Arc<dyn ArticleFetcher>,
    checker: Arc<dyn ClaimChecker>,
    min_words: usize,
    excerpt_chars: usize,
    fetch_timeout: Duration,
    fact_check_timeout: Duration,
}

impl std::fmt::Debug for DetectorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorService")
            .field("policy", &self.policy)
            .field("fetcher", &self.fetcher.name())
            .field("checker", &self.checker.name())
            .field("min_words", &self.min_words)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("fact_check_timeout", &self.fact_check_timeout)
            .finish()
    }
}

impl DetectorService {
    pub fn new(
        model: ModelHandle,
        config: &DetectorConfig,
        fetcher: Arc<dyn ArticleFetcher>,
        checker: Arc<dyn ClaimChecker>,
    ) -> Self {
        DetectorService {
            model,
            policy: DecisionPolicy::from_config(config),
            fetcher,
            checker,
            min_words: config.min_words,
            excerpt_chars: config.excerpt_chars,
            fetch_timeout: config.fetch_timeout(),
            fact_check_timeout: config.fact_check_timeout(),
        }
    }

    /// Build the service with the HTTP fetcher and, when an API key is
    /// configured, the Google fact-check client.
    pub fn from_config(model: ModelHandle, config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Arc::new(HttpArticleFetcher::new(
            &config.user_agent,
            config.fetch_timeout(),
        )?);
        let checker: Arc<dyn ClaimChecker> = match &config.fact_check_api_key {
            Some(key) => Arc::new(
                GoogleFactCheckClient::new(
                    &config.fact_check_endpoint,
                    key,
                    config.fact_check_timeout(),
                )?
                .with_language_code(&config.fact_check_language),
            ),
            None => {
                debug!("No fact-check API key configured; fact-check lookups disabled");
                Arc::new(NoopClaimChecker)
            }
        };
        Ok(Self::new(model, config, fetcher, checker))
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Classify one request. Never fails: errors are reported in the response.
    pub async fn check(&self, request: CheckRequest) -> CheckResponse {
        match request.mode {
            CheckMode::Text => self.check_text(&request.content).await,
            CheckMode::Url => self.check_url(&request.content).await,
        }
    }

    async fn check_text(&self, text: &str) -> CheckResponse {
        let words = text.split_whitespace().count();
        if words < self.min_words {
            debug!("Rejected input with {words} words (minimum {})", self.min_words);
            return CheckResponse::error(ErrorKind::Validation, SHORT_INPUT_MESSAGE);
        }

        match self.classify(text, None, text).await {
            Ok(verdict) => CheckResponse::Ok {
                verdict,
                extracted: None,
            },
            Err(e) => CheckResponse::error(ErrorKind::Internal, e.to_string()),
        }
    }

    async fn check_url(&self, raw_url: &str) -> CheckResponse {
        let url = match Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(e) => {
                return CheckResponse::error(ErrorKind::Parse, format!("Invalid URL: {e}"));
            }
        };

        let article = match self.fetch(&url).await {
            Ok(article) => article,
            Err(e) => {
                warn!("Could not extract article from {url}: {e}");
                return e.into();
            }
        };

        let query = if article.title.trim().is_empty() {
            article.text.as_str()
        } else {
            article.title.as_str()
        };

        match self.classify(&article.text, Some(&url), query).await {
            Ok(verdict) => CheckResponse::Ok {
                verdict,
                extracted: Some(ExtractedArticle::new(
                    &article.title,
                    &article.text,
                    self.excerpt_chars,
                )),
            },
            Err(e) => CheckResponse::error(ErrorKind::Internal, e.to_string()),
        }
    }

    async fn fetch(&self, url: &Url) -> std::result::Result<Article, FetchError> {
        let article = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| {
                FetchError::timeout(format!(
                    "No response from {url} within {} ms",
                    self.fetch_timeout.as_millis()
                ))
            })??;

        if article.text.trim().is_empty() {
            return Err(FetchError::empty_content("No content found in article."));
        }
        Ok(article)
    }

    async fn classify(&self, text: &str, source: Option<&Url>, query: &str) -> Result<Verdict> {
        let model = self.model.current();
        let prediction = model.classify(text)?;
        debug!(
            "Model predicted {} (score {:.4}) for {} normalized characters",
            prediction.label,
            prediction.score,
            prediction.normalized_text.len()
        );

        let mut verdict = self.policy.evaluate(&prediction, source);
        if self.policy.wants_fact_check(&verdict) {
            let review = self.fact_check(query).await;
            self.policy.apply_fact_check(&mut verdict, review);
        }

        Ok(verdict)
    }

    /// Best-effort lookup; failures and timeouts yield `None`.
    async fn fact_check(&self, query: &str) -> Option<ClaimReview> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        if query.is_empty() {
            return None;
        }

        match tokio::time::timeout(self.fact_check_timeout, self.checker.search(query)).await {
            Ok(Ok(review)) => review,
            Ok(Err(e)) => {
                warn!("Fact-check lookup via {} failed: {e}", self.checker.name());
                None
            }
            Err(_) => {
                warn!(
                    "Fact-check lookup via {} timed out after {} ms",
                    self.checker.name(),
                    self.fact_check_timeout.as_millis()
                );
                None
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Convert a check failure into a crate error, for callers that prefer `?`.
impl TryFrom<CheckResponse> for Verdict {
    type Error = VerityError;

    fn try_from(response: CheckResponse) -> Result<Self> {
        match response {
            CheckResponse::Ok { verdict, .. } => Ok(verdict),
            CheckResponse::Error { kind, message } => match kind {
                ErrorKind::Validation => Err(VerityError::validation(message)),
                ErrorKind::Internal => Err(VerityError::other(message)),
                ErrorKind::Network => Err(FetchError::network(message).into()),
                ErrorKind::Parse => Err(FetchError::parse(message).into()),
                ErrorKind::EmptyContent => Err(FetchError::empty_content(message).into()),
                ErrorKind::Forbidden => Err(FetchError::forbidden(message).into()),
                ErrorKind::Timeout => Err(FetchError::timeout(message).into()),
            },
        }
    }
}
