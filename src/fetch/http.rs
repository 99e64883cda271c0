//! HTTP article fetcher backed by reqwest and scraper.

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{Article, ArticleFetcher, FetchError, FetchResult};
use crate::error::Result;

/// Downloads a page and extracts its headline and paragraphs.
#[derive(Debug, Clone)]
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    /// Build a fetcher that identifies itself with `user_agent` and gives up
    /// after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<Article> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::parse(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        debug!("Fetching article from {url}");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("Article request to {url} failed: {e}");
            if e.is_timeout() {
                FetchError::timeout(format!("Timed out fetching {url}"))
            } else {
                FetchError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            warn!("Article request to {url} was refused with {status}");
            return Err(FetchError::forbidden(format!(
                "{status}: the site refused access to this article"
            )));
        }
        if !status.is_success() {
            warn!("Article request to {url} failed with {status}");
            return Err(FetchError::network(format!("HTTP {status} from {url}")));
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(format!("Timed out reading {url}"))
            } else {
                FetchError::network(e.to_string())
            }
        })?;

        let (title, text) = extract_article(&html)?;
        debug!("Extracted {} characters from {url}", text.len());

        Ok(Article {
            url: url.clone(),
            title,
            text,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn selector(css: &str) -> FetchResult<Selector> {
    Selector::parse(css).map_err(|e| FetchError::parse(format!("Invalid selector {css}: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn paragraphs(document: &Html, css: &str) -> FetchResult<Vec<String>> {
    Ok(document
        .select(&selector(css)?)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}

/// Extract `(title, body)` from an HTML page.
///
/// The title comes from `og:title`, then `<title>`, then the first `<h1>`.
/// The body is the paragraphs inside `<article>`, or every paragraph on the
/// page when there is no article element.
pub fn extract_article(html: &str) -> FetchResult<(String, String)> {
    let document = Html::parse_document(html);

    let og_title = document
        .select(&selector(r#"meta[property="og:title"]"#)?)
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|content| !content.is_empty());
    let mut title = og_title.unwrap_or_default();
    for css in ["title", "h1"] {
        if !title.is_empty() {
            break;
        }
        title = document
            .select(&selector(css)?)
            .map(element_text)
            .find(|text| !text.is_empty())
            .unwrap_or_default();
    }

    let mut body = paragraphs(&document, "article p")?;
    if body.is_empty() {
        body = paragraphs(&document, "p")?;
    }
    if body.is_empty() {
        return Err(FetchError::empty_content("No content found in article."));
    }

    Ok((title, body.join("\n\n")))
}
