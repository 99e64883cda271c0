//! Trusted source and keyword lists.

use url::Url;

/// Canonical trusted hosts.
///
/// A host matches an entry when it equals the entry or is a subdomain of it,
/// so `www.bbc.com` and `news.bbc.com` match `bbc.com` while
/// `fakendtv.com.evil.net` does not match `ndtv.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedDomains {
    domains: Vec<String>,
}

/// Lowercase, drop any scheme/path, a leading `www.` and surrounding dots.
fn canonical_host(raw: &str) -> Option<String> {
    let raw = raw.trim().to_ascii_lowercase();
    let host = if raw.contains("://") {
        Url::parse(&raw).ok()?.host_str()?.to_string()
    } else {
        raw.split(['/', '?', '#']).next().unwrap_or_default().to_string()
    };
    let host = host.trim_start_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.trim_end_matches('.');
    (!host.is_empty()).then(|| host.to_string())
}

impl TrustedDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = domains
            .into_iter()
            .filter_map(|d| canonical_host(d.as_ref()))
            .collect();
        canonical.sort();
        canonical.dedup();
        TrustedDomains { domains: canonical }
    }

    /// The trusted entry `host` falls under, if any.
    pub fn match_host(&self, host: &str) -> Option<&str> {
        let host = canonical_host(host)?;
        self.domains
            .iter()
            .find(|domain| {
                host == **domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .map(String::as_str)
    }

    /// The trusted entry the URL's host falls under, if any.
    pub fn match_url(&self, url: &Url) -> Option<&str> {
        self.match_host(url.host_str()?)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Lowercase keywords looked up as substrings of normalized text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedKeywords {
    keywords: Vec<String>,
}

impl TrustedKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        TrustedKeywords { keywords }
    }

    /// The first keyword contained in `normalized_text`, if any.
    pub fn find_in(&self, normalized_text: &str) -> Option<&str> {
        let text = normalized_text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| text.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> TrustedDomains {
        TrustedDomains::new(["ndtv.com", "BBC.com", "https://www.reuters.com/", " toi.in. "])
    }

    #[test]
    fn test_exact_and_subdomain_match() {
        let trusted = domains();
        assert_eq!(trusted.match_host("ndtv.com"), Some("ndtv.com"));
        assert_eq!(trusted.match_host("www.ndtv.com"), Some("ndtv.com"));
        assert_eq!(trusted.match_host("sports.NDTV.com"), Some("ndtv.com"));
        assert_eq!(trusted.match_host("bbc.com"), Some("bbc.com"));
        assert_eq!(trusted.match_host("reuters.com"), Some("reuters.com"));
        assert_eq!(trusted.match_host("toi.in"), Some("toi.in"));
    }

    #[test]
    fn test_lookalike_hosts_rejected() {
        let trusted = domains();
        assert_eq!(trusted.match_host("fakendtv.com"), None);
        assert_eq!(trusted.match_host("fakendtv.com.evil.net"), None);
        assert_eq!(trusted.match_host("ndtv.com.evil.net"), None);
        assert_eq!(trusted.match_host("notbbc.com"), None);
    }

    #[test]
    fn test_match_url() {
        let trusted = domains();
        let url = Url::parse("https://www.ndtv.com/india-news/story-123").unwrap();
        assert_eq!(trusted.match_url(&url), Some("ndtv.com"));

        let url = Url::parse("https://evil.net/ndtv.com/story").unwrap();
        assert_eq!(trusted.match_url(&url), None);

        let url = Url::parse("https://fakendtv.com.evil.net/story").unwrap();
        assert_eq!(trusted.match_url(&url), None);
    }

    #[test]
    fn test_canonicalization() {
        assert_eq!(domains().len(), 4);
        assert!(TrustedDomains::new(["", "  ", "www."]).is_empty());
    }

    #[test]
    fn test_keywords() {
        let keywords = TrustedKeywords::new(["ISRO", "united nations", " "]);
        assert_eq!(keywords.len(), 2);
        assert_eq!(
            keywords.find_in("president announced new award isro scientists today"),
            Some("isro")
        );
        assert_eq!(
            keywords.find_in("united nations assembly votes"),
            Some("united nations")
        );
        assert_eq!(keywords.find_in("aliens control government"), None);
        assert_eq!(keywords.find_in(""), None);
    }

    #[test]
    fn test_default_keywords_ignore_ordinary_words() {
        let config = crate::config::DetectorConfig::default();
        let keywords = TrustedKeywords::new(&config.trusted_keywords);
        assert_eq!(keywords.find_in("satellite orbit hoax"), None);
        assert_eq!(keywords.find_in("wind turbine herbicide sorbitol"), None);
        assert_eq!(
            keywords.find_in("president announced new award isro scientists today"),
            Some("isro")
        );
    }
}
