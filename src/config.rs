//! Runtime configuration for the detector.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};

/// Environment variable holding the fact-check API key.
pub const ENV_FACT_CHECK_API_KEY: &str = "VERITY_FACT_CHECK_API_KEY";
pub const ENV_FETCH_TIMEOUT_MS: &str = "VERITY_FETCH_TIMEOUT_MS";
pub const ENV_FACT_CHECK_TIMEOUT_MS: &str = "VERITY_FACT_CHECK_TIMEOUT_MS";
pub const ENV_MIN_WORDS: &str = "VERITY_MIN_WORDS";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_FACT_CHECK_ENDPOINT: &str =
    "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// Detector configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum whitespace-separated words for pasted text.
    pub min_words: usize,
    /// Token length threshold `verity train` uses when no
    /// `--min-token-length` is given. Loaded models keep the threshold they
    /// were trained with.
    pub min_token_length: usize,
    /// Hosts whose articles are trusted. Subdomains match too.
    pub trusted_domains: Vec<String>,
    /// Terms that mark normalized text as trustworthy.
    pub trusted_keywords: Vec<String>,
    pub fetch_timeout_ms: u64,
    pub fact_check_timeout_ms: u64,
    /// `User-Agent` sent when fetching articles.
    pub user_agent: String,
    pub fact_check_endpoint: String,
    /// Fact-check lookups are skipped when unset.
    pub fact_check_api_key: Option<String>,
    /// `languageCode` sent with fact-check queries.
    pub fact_check_language: String,
    /// Rating words that confirm a claim.
    pub affirming_terms: Vec<String>,
    /// Length of the article excerpt returned with a URL verdict.
    pub excerpt_chars: usize,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            min_words: 5,
            min_token_length: 2,
            trusted_domains: strings(&[
                "thehindu.com",
                "ndtv.com",
                "bbc.com",
                "bbc.co.uk",
                "reuters.com",
                "indiatoday.in",
                "toi.in",
                "timesofindia.indiatimes.com",
            ]),
            trusted_keywords: strings(&[
                "isro",
                "award",
                "nasa",
                "united nations",
                "supreme court",
                "election commission",
            ]),
            fetch_timeout_ms: 5000,
            fact_check_timeout_ms: 3000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fact_check_endpoint: DEFAULT_FACT_CHECK_ENDPOINT.to_string(),
            fact_check_api_key: None,
            fact_check_language: "en".to_string(),
            affirming_terms: strings(&["true", "correct", "accurate"]),
            excerpt_chars: 500,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VerityError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| VerityError::config(format!("Failed to parse config: {e}")))
    }

    /// Load from `path` if given, otherwise use defaults; then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `VERITY_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_FACT_CHECK_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.fact_check_api_key = Some(key.trim().to_string());
        }

        let parse = |name: &str, value: String| {
            value.trim().parse::<u64>().map_err(|_| {
                VerityError::config(format!("{name} must be a non-negative integer, got {value:?}"))
            })
        };
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_MS) {
            self.fetch_timeout_ms = parse(ENV_FETCH_TIMEOUT_MS, value)?;
        }
        if let Some(value) = lookup(ENV_FACT_CHECK_TIMEOUT_MS) {
            self.fact_check_timeout_ms = parse(ENV_FACT_CHECK_TIMEOUT_MS, value)?;
        }
        if let Some(value) = lookup(ENV_MIN_WORDS) {
            self.min_words = parse(ENV_MIN_WORDS, value)? as usize;
        }

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.min_words == 0 {
            return Err(VerityError::config("min_words must be positive"));
        }
        if self.fetch_timeout_ms == 0 || self.fact_check_timeout_ms == 0 {
            return Err(VerityError::config("Timeouts must be positive"));
        }
        if self.fact_check_language.trim().is_empty() {
            return Err(VerityError::config("fact_check_language cannot be empty"));
        }
        if self.affirming_terms.is_empty() {
            return Err(VerityError::config("affirming_terms cannot be empty"));
        }
        url::Url::parse(&self.fact_check_endpoint).map_err(|e| {
            VerityError::config(format!(
                "Invalid fact-check endpoint '{}': {e}",
                self.fact_check_endpoint
            ))
        })?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn fact_check_timeout(&self) -> Duration {
        Duration::from_millis(self.fact_check_timeout_ms)
    }
}
