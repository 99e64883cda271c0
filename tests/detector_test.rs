use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use verity::config::DetectorConfig;
use verity::detect::{CheckRequest, DetectorService, ErrorKind, OverrideReason};
use verity::error::Result;
use verity::factcheck::{ClaimChecker, ClaimReview, NoopClaimChecker, StaticClaimChecker};
use verity::fetch::{Article, ArticleFetcher, FetchError, FetchResult, StaticArticleFetcher};
use verity::ml::classifier::{ClassifierFamily, Label};
use verity::ml::model::{ModelHandle, NewsModel};
use verity::ml::training::{LabeledDocument, TrainingOptions, TrainingPipeline};

const ISRO_TEXT: &str = "The president announced a new award for ISRO scientists today";
const HOAX_TEXT: &str = "Shocking aliens secret revealed today by anonymous insiders";
const NEWS_URL: &str = "https://www.ndtv.com/india-news/story-123";
const UNKNOWN_URL: &str = "https://rumours.example.net/story";

fn corpus() -> Vec<LabeledDocument> {
    let fake = [
        "The president announced new scientists today",
        "President announced shocking miracle cure today",
        "Scientists announced aliens control the president",
        "Secret miracle cure announced by anonymous scientists",
        "Shocking aliens secret revealed today",
        "Anonymous insiders say the president is an alien",
        "Shocking secret insiders revealed today",
    ];
    let real = [
        "Parliament passes annual budget after lengthy debate",
        "Central bank holds interest rates steady this quarter",
        "Finance ministry publishes quarterly budget figures",
        "Parliament committee reviews infrastructure spending report",
        "Central bank governor addresses parliament on inflation",
        "Ministry report shows steady growth in quarterly exports",
        "Budget committee publishes annual spending figures",
    ];
    fake.iter()
        .map(|t| LabeledDocument::new(*t, Label::Fake))
        .chain(real.iter().map(|t| LabeledDocument::new(*t, Label::Real)))
        .collect()
}

fn train(family: ClassifierFamily) -> Result<NewsModel> {
    let pipeline = TrainingPipeline::new(TrainingOptions {
        seed: Some(42),
        test_fraction: 0.0,
        family,
        ..Default::default()
    })?;
    let (model, _) = pipeline.train(corpus())?;
    Ok(model)
}

fn config() -> DetectorConfig {
    DetectorConfig {
        fetch_timeout_ms: 200,
        fact_check_timeout_ms: 100,
        ..Default::default()
    }
}

fn service(fetcher: StaticArticleFetcher, checker: Arc<dyn ClaimChecker>) -> Result<DetectorService> {
    let model = ModelHandle::new(train(ClassifierFamily::PassiveAggressive)?);
    Ok(DetectorService::new(model, &config(), Arc::new(fetcher), checker))
}

/// Never answers within any reasonable timeout.
struct StallingFetcher;

#[async_trait]
impl ArticleFetcher for StallingFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<Article> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(FetchError::network(format!("gave up on {url}")))
    }

    fn name(&self) -> &str {
        "stalling"
    }
}

#[tokio::test]
async fn test_trusted_keyword_overrides_fake_prediction() -> Result<()> {
    let service = service(StaticArticleFetcher::new(), Arc::new(NoopClaimChecker))?;

    let response = service.check(CheckRequest::text(ISRO_TEXT)).await;
    let verdict = response.verdict().expect("verdict");

    assert_eq!(verdict.model_label(), Label::Fake);
    assert_eq!(verdict.label(), Label::Real);
    assert_eq!(verdict.reason(), OverrideReason::TrustedKeyword);
    assert!(verdict.signals().trusted_keyword);
    assert!(!verdict.signals().trusted_domain);
    Ok(())
}

#[tokio::test]
async fn test_short_text_is_rejected() -> Result<()> {
    let service = service(StaticArticleFetcher::new(), Arc::new(NoopClaimChecker))?;

    let response = service.check(CheckRequest::text("xyz qqq zzz")).await;
    assert!(!response.is_ok());
    assert!(response.verdict().is_none());
    assert_eq!(response.error_kind(), Some(ErrorKind::Validation));

    let response = service.check(CheckRequest::text("   ")).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::Validation));
    Ok(())
}

#[tokio::test]
async fn test_model_prediction_without_overrides() -> Result<()> {
    let service = service(StaticArticleFetcher::new(), Arc::new(NoopClaimChecker))?;

    let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
    let verdict = response.verdict().expect("verdict");
    assert_eq!(verdict.label(), Label::Fake);
    assert_eq!(verdict.reason(), OverrideReason::ModelPrediction);
    assert!(!verdict.is_overridden());

    let response = service
        .check(CheckRequest::text(
            "Central bank publishes quarterly budget figures after debate",
        ))
        .await;
    let verdict = response.verdict().expect("verdict");
    assert_eq!(verdict.label(), Label::Real);
    assert_eq!(verdict.reason(), OverrideReason::ModelPrediction);
    Ok(())
}

#[tokio::test]
async fn test_trusted_domain_overrides_fake_article() -> Result<()> {
    let fetcher = StaticArticleFetcher::new().with_article(NEWS_URL, "Insiders speak", HOAX_TEXT);
    let service = service(fetcher, Arc::new(NoopClaimChecker))?;

    let response = service.check(CheckRequest::url(NEWS_URL)).await;
    let verdict = response.verdict().expect("verdict");

    assert_eq!(verdict.model_label(), Label::Fake);
    assert_eq!(verdict.label(), Label::Real);
    assert_eq!(verdict.reason(), OverrideReason::TrustedDomain);
    assert!(verdict.signals().trusted_domain);
    Ok(())
}

#[tokio::test]
async fn test_lookalike_domain_is_not_trusted() -> Result<()> {
    let url = "https://fakendtv.com.evil.net/story";
    let fetcher = StaticArticleFetcher::new().with_article(url, "Insiders speak", HOAX_TEXT);
    let service = service(fetcher, Arc::new(NoopClaimChecker))?;

    let response = service.check(CheckRequest::url(url)).await;
    let verdict = response.verdict().expect("verdict");
    assert_eq!(verdict.label(), Label::Fake);
    assert!(!verdict.signals().trusted_domain);
    Ok(())
}

#[tokio::test]
async fn test_url_response_carries_excerpt() -> Result<()> {
    let long_text = format!("{HOAX_TEXT} {}", "more words here ".repeat(100));
    let fetcher = StaticArticleFetcher::new().with_article(UNKNOWN_URL, "Insiders speak", &long_text);
    let service = service(fetcher, Arc::new(NoopClaimChecker))?;

    let json = serde_json::to_value(service.check(CheckRequest::url(UNKNOWN_URL)).await)?;
    assert_eq!(json["status"], "OK");
    assert_eq!(json["extracted"]["title"], "Insiders speak");
    let excerpt = json["extracted"]["excerpt"].as_str().expect("excerpt");
    assert!(excerpt.ends_with("..."));
    assert!(excerpt.chars().count() <= 503);
    Ok(())
}

#[tokio::test]
async fn test_affirming_fact_check_overrides_fake() -> Result<()> {
    let checker = StaticClaimChecker::responding(Some(ClaimReview::new(
        "Aliens secret revealed",
        "True",
    )));
    let service = service(StaticArticleFetcher::new(), Arc::new(checker))?;

    let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
    let verdict = response.verdict().expect("verdict");
    assert_eq!(verdict.label(), Label::Real);
    assert_eq!(verdict.reason(), OverrideReason::FactCheck);
    let signal = verdict.signals().fact_check.as_ref().expect("fact-check signal");
    assert!(signal.affirming);
    Ok(())
}

#[tokio::test]
async fn test_non_affirming_fact_check_keeps_fake() -> Result<()> {
    for rating in ["False", "Mostly false", "Not true", "Half true"] {
        let checker =
            StaticClaimChecker::responding(Some(ClaimReview::new("Aliens secret revealed", rating)));
        let service = service(StaticArticleFetcher::new(), Arc::new(checker))?;

        let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
        let verdict = response.verdict().expect("verdict");
        assert_eq!(verdict.label(), Label::Fake, "rating {rating}");
        assert_eq!(verdict.reason(), OverrideReason::ModelPrediction);
    }
    Ok(())
}

#[tokio::test]
async fn test_negative_fact_check_never_flips_real() -> Result<()> {
    let checker =
        StaticClaimChecker::responding(Some(ClaimReview::new("Insiders speak", "False")));
    let fetcher = StaticArticleFetcher::new().with_article(NEWS_URL, "Insiders speak", HOAX_TEXT);
    let service = service(fetcher, Arc::new(checker))?;

    let response = service.check(CheckRequest::url(NEWS_URL)).await;
    let verdict = response.verdict().expect("verdict");
    assert_eq!(verdict.label(), Label::Real);
    assert_eq!(verdict.reason(), OverrideReason::TrustedDomain);
    Ok(())
}

#[tokio::test]
async fn test_fact_check_failures_are_absorbed() -> Result<()> {
    let checkers: Vec<Arc<dyn ClaimChecker>> = vec![
        Arc::new(StaticClaimChecker::failing("503 Service Unavailable")),
        Arc::new(StaticClaimChecker::stalling(Duration::from_secs(30))),
    ];

    for checker in checkers {
        let service = service(StaticArticleFetcher::new(), checker)?;
        let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
        assert!(response.is_ok());
        let verdict = response.verdict().expect("verdict");
        assert_eq!(verdict.label(), Label::Fake);
        assert!(verdict.signals().fact_check.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_extraction_errors() -> Result<()> {
    let fetcher = StaticArticleFetcher::new()
        .with_error(
            "https://blocked.example.com/a",
            FetchError::forbidden("403 Forbidden"),
        )
        .with_article("https://empty.example.com/a", "Title only", "  ");
    let service = service(fetcher, Arc::new(NoopClaimChecker))?;

    let kind = |url: &'static str| {
        let service = &service;
        async move { service.check(CheckRequest::url(url)).await.error_kind() }
    };

    assert_eq!(kind("https://blocked.example.com/a").await, Some(ErrorKind::Forbidden));
    assert_eq!(kind("https://empty.example.com/a").await, Some(ErrorKind::EmptyContent));
    assert_eq!(kind("https://unreachable.example.com/a").await, Some(ErrorKind::Network));
    assert_eq!(kind("not a url").await, Some(ErrorKind::Parse));
    Ok(())
}

#[tokio::test]
async fn test_fetch_timeout() -> Result<()> {
    let model = ModelHandle::new(train(ClassifierFamily::PassiveAggressive)?);
    let service = DetectorService::new(
        model,
        &config(),
        Arc::new(StallingFetcher),
        Arc::new(NoopClaimChecker),
    );

    let response = service.check(CheckRequest::url(UNKNOWN_URL)).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::Timeout));
    Ok(())
}

#[tokio::test]
async fn test_logistic_model_reports_confidence() -> Result<()> {
    let model = ModelHandle::new(train(ClassifierFamily::Logistic)?);
    let service = DetectorService::new(
        model,
        &config(),
        Arc::new(StaticArticleFetcher::new()),
        Arc::new(NoopClaimChecker),
    );

    let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
    let confidence = response.verdict().and_then(|v| v.confidence()).expect("confidence");
    assert!((0.5..=1.0).contains(&confidence));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_the_model() -> Result<()> {
    let service = Arc::new(service(StaticArticleFetcher::new(), Arc::new(NoopClaimChecker))?);

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let text = if i % 2 == 0 { HOAX_TEXT } else { ISRO_TEXT };
            service.check(CheckRequest::text(text)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let response = handle.await.expect("task panicked");
        let verdict = response.verdict().expect("verdict");
        let expected = if i % 2 == 0 { Label::Fake } else { Label::Real };
        assert_eq!(verdict.label(), expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_model_swap_is_visible_to_later_requests() -> Result<()> {
    let service = service(StaticArticleFetcher::new(), Arc::new(NoopClaimChecker))?;
    let before = service.model().current();

    let replaced = service.model().replace(train(ClassifierFamily::Logistic)?);
    assert!(Arc::ptr_eq(&before, &replaced));
    assert!(service.model().current().supports_confidence());

    let response = service.check(CheckRequest::text(HOAX_TEXT)).await;
    assert!(response.verdict().and_then(|v| v.confidence()).is_some());
    Ok(())
}
