//! In-memory article fetcher for tests and offline runs.

use std::collections::HashMap;

use url::Url;

use super::{Article, ArticleFetcher, FetchError, FetchResult};

/// Serves canned responses keyed by URL; unknown URLs fail with `Network`.
#[derive(Debug, Clone, Default)]
pub struct StaticArticleFetcher {
    responses: HashMap<String, FetchResult<(String, String)>>,
}

impl StaticArticleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `url` with the given title and body.
    pub fn with_article(mut self, url: &str, title: &str, text: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok((title.to_string(), text.to_string())));
        self
    }

    /// Respond to `url` with an error.
    pub fn with_error(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }
}

#[async_trait::async_trait]
impl ArticleFetcher for StaticArticleFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<Article> {
        match self.responses.get(url.as_str()) {
            Some(Ok((title, text))) => {
                if text.trim().is_empty() {
                    return Err(FetchError::empty_content("No content found in article."));
                }
                Ok(Article {
                    url: url.clone(),
                    title: title.clone(),
                    text: text.clone(),
                })
            }
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::network(format!("No response registered for {url}"))),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
