//! Article fetching.
//!
//! An [`ArticleFetcher`] turns a URL into an [`Article`] (title and body
//! text) or a [`FetchError`] whose [`FetchErrorKind`] tells the caller what
//! went wrong. Fetch failures end the request; nothing is retried.

pub mod http;
pub mod mock;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use http::HttpArticleFetcher;
pub use mock::StaticArticleFetcher;

/// Why an article could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchErrorKind {
    /// Transport failure or a non-success HTTP status.
    Network,
    /// The URL or the returned document could not be parsed.
    Parse,
    /// The page had no article text.
    EmptyContent,
    /// The origin refused access (HTTP 401/403).
    Forbidden,
    /// The fetch did not complete in time.
    Timeout,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::Network => "NETWORK",
            FetchErrorKind::Parse => "PARSE",
            FetchErrorKind::EmptyContent => "EMPTY_CONTENT",
            FetchErrorKind::Forbidden => "FORBIDDEN",
            FetchErrorKind::Timeout => "TIMEOUT",
        };
        f.write_str(name)
    }
}

/// Article extraction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new<S: Into<String>>(kind: FetchErrorKind, message: S) -> Self {
        FetchError {
            kind,
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::new(FetchErrorKind::Network, message)
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::new(FetchErrorKind::Parse, message)
    }

    pub fn empty_content<S: Into<String>>(message: S) -> Self {
        Self::new(FetchErrorKind::EmptyContent, message)
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::new(FetchErrorKind::Forbidden, message)
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// An extracted news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: Url,
    /// Headline; empty when the page has none.
    pub title: String,
    /// Body text, never empty.
    pub text: String,
}

/// Fetches and extracts articles.
#[async_trait::async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult<Article>;

    /// Get the name of this fetcher for logging.
    fn name(&self) -> &str;
}
