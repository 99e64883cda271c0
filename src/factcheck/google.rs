//! Google Fact Check Tools claim search.

use std::time::Duration;

use log::debug;
use serde::Deserialize;
use url::Url;

use super::{ClaimChecker, ClaimReview};
use crate::error::{Result, VerityError};

/// Client for the `claims:search` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleFactCheckClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claim {
    #[serde(default)]
    text: String,
    #[serde(default)]
    claim_review: Vec<Review>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Review {
    #[serde(default)]
    textual_rating: String,
    url: Option<String>,
    publisher: Option<Publisher>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

impl GoogleFactCheckClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| VerityError::config(format!("Invalid fact-check endpoint: {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            language_code: "en".to_string(),
        })
    }

    pub fn with_language_code(mut self, language_code: &str) -> Self {
        self.language_code = language_code.to_string();
        self
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("key", &self.api_key)
            .append_pair("languageCode", &self.language_code);
        url
    }
}

/// First claim that carries a review with a rating.
fn first_review(response: ClaimSearchResponse) -> Option<ClaimReview> {
    response.claims.into_iter().find_map(|claim| {
        let text = claim.text;
        claim
            .claim_review
            .into_iter()
            .find(|review| !review.textual_rating.trim().is_empty())
            .map(|review| ClaimReview {
                claim_text: text,
                textual_rating: review.textual_rating,
                publisher: review.publisher.and_then(|p| p.name),
                review_url: review.url,
            })
    })
}

#[async_trait::async_trait]
impl ClaimChecker for GoogleFactCheckClient {
    async fn search(&self, query: &str) -> Result<Option<ClaimReview>> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let response = self.client.get(self.request_url(query)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerityError::other(format!(
                "Fact-check search failed with {status}"
            )));
        }

        let body: ClaimSearchResponse = response.json().await?;
        debug!("Fact-check search returned {} claims", body.claims.len());
        Ok(first_review(body))
    }

    fn name(&self) -> &str {
        "google-fact-check"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let client = GoogleFactCheckClient::new(
            "https://factchecktools.googleapis.com/v1alpha1/claims:search",
            "k3y",
            Duration::from_secs(3),
        )
        .unwrap();
        let url = client.request_url("ISRO award & prize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "ISRO award & prize".to_string()),
                ("key".to_string(), "k3y".to_string()),
                ("languageCode".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_language() {
        let client = GoogleFactCheckClient::new(
            "https://factchecktools.googleapis.com/v1alpha1/claims:search",
            "k3y",
            Duration::from_secs(3),
        )
        .unwrap()
        .with_language_code("hi");
        let url = client.request_url("ISRO");
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "languageCode" && v == "hi")
        );
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "claims": [
                { "text": "No reviews here", "claimReview": [] },
                {
                    "text": "ISRO scientists received an award",
                    "claimant": "Social media",
                    "claimReview": [{
                        "publisher": { "name": "Example Checks", "site": "example.org" },
                        "url": "https://example.org/review",
                        "title": "Review",
                        "textualRating": "True",
                        "languageCode": "en"
                    }]
                }
            ],
            "nextPageToken": "abc"
        }"#;
        let response: ClaimSearchResponse = serde_json::from_str(json).unwrap();
        let review = first_review(response).unwrap();
        assert_eq!(review.claim_text, "ISRO scientists received an award");
        assert_eq!(review.textual_rating, "True");
        assert_eq!(review.publisher.as_deref(), Some("Example Checks"));
    }

    #[test]
    fn test_empty_response() {
        let response: ClaimSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(first_review(response).is_none());
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(GoogleFactCheckClient::new("not a url", "k", Duration::from_secs(1)).is_err());
    }
}
