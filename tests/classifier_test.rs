use httpmock::prelude::*;
use industry_lock::adapters::kv::MemoryKvStore;
use industry_lock::config::settings::{ClassifierSettings, ResolverSettings};
use industry_lock::core::catalog::PACKS_DOCUMENT_KEY;
use industry_lock::core::classifier::AiClassifierClient;
use industry_lock::core::resolver::{IndustryResolver, ResolveContext};
use industry_lock::core::rule_store::RuleStore;
use industry_lock::core::taxonomy::Taxonomy;
use industry_lock::domain::model::{ClassifyRequest, LockSource};
use industry_lock::domain::ports::IndustryClassifier;
use std::sync::Arc;
use std::time::Duration;

const HOSPITAL_HOMEPAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Riverside Medical Center</title>
  <meta name="description" content="Compassionate care for every family.">
  <script type="application/ld+json">
    {"@context": "https://schema.org", "@type": "Hospital", "name": "Riverside Medical Center"}
  </script>
</head>
<body>
  <nav>
    <a href="/doctors">Find a Doctor</a>
    <a href="/er">Emergency</a>
    <a href="/portal">Patient Portal</a>
  </nav>
  <h1>Patient care close to home</h1>
  <p>Our hospital has served the valley for ninety years.</p>
</body>
</html>"#;

fn client() -> AiClassifierClient {
    let settings = ClassifierSettings {
        fetch_timeout: Duration::from_secs(2),
        ..ClassifierSettings::default()
    };
    AiClassifierClient::new(Taxonomy::compiled(), settings).unwrap()
}

fn request(domain: &str, root_url: String) -> ClassifyRequest {
    ClassifyRequest {
        domain: domain.to_string(),
        root_url,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_classifies_from_fetched_homepage() {
    let server = MockServer::start_async().await;
    let homepage = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(HOSPITAL_HOMEPAGE);
        })
        .await;

    let result = client()
        .classify(&request("riverside-health.org", server.url("/")))
        .await
        .unwrap();

    homepage.assert_async().await;
    assert_eq!(result.primary.industry_key, "healthcare.hospital");
    assert!((result.primary.confidence - 0.75).abs() < 1e-9);
    assert_eq!(result.primary.source, "ai_worker");
    assert_eq!(result.evidence.title.as_deref(), Some("Riverside Medical Center"));
    assert_eq!(result.evidence.schema, Some(vec!["Hospital".to_string()]));
    assert!(result
        .alts
        .iter()
        .all(|alt| alt.industry_key != "healthcare.pharmaceutical"));
}

#[tokio::test]
async fn test_error_status_falls_back_to_domain_signals() {
    let server = MockServer::start_async().await;
    let homepage = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(500).body("upstream exploded");
        })
        .await;

    let result = client()
        .classify(&request("toyota.com", server.url("/")))
        .await
        .unwrap();

    homepage.assert_async().await;
    assert_eq!(result.primary.industry_key, "automotive.oem");
    assert!((result.primary.confidence - 0.35).abs() < 1e-9);
    assert_eq!(result.evidence.title, None);
}

#[tokio::test]
async fn test_zero_crawl_budget_skips_fetch() {
    let server = MockServer::start_async().await;
    let homepage = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(HOSPITAL_HOMEPAGE);
        })
        .await;

    let mut req = request("joespizza.com", server.url("/"));
    req.crawl_budget = Some(0);
    req.keywords = vec!["menu".to_string(), "delivery".to_string()];

    let result = client().classify(&req).await.unwrap();

    assert_eq!(homepage.hits_async().await, 0);
    assert_eq!(result.primary.industry_key, "food.restaurant");
    assert_eq!(
        result.evidence.keywords,
        Some(vec!["menu".to_string(), "delivery".to_string()])
    );
}

#[tokio::test]
async fn test_resolver_applies_schema_boost_and_writes_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .body(HOSPITAL_HOMEPAGE);
        })
        .await;

    let store = MemoryKvStore::new();
    let rules = RuleStore::load(store.clone(), PACKS_DOCUMENT_KEY).await;
    let resolver = IndustryResolver::new(Arc::new(rules), client(), ResolverSettings::default());

    let ctx = ResolveContext::for_domain("riverside-health.org").with_root_url(server.url("/"));
    let lock = resolver.resolve(&ctx).await;

    assert_eq!(lock.value, "healthcare.hospital");
    assert_eq!(lock.source, LockSource::AiWorker);
    assert!((lock.confidence.unwrap() - 0.85).abs() < 1e-9);
    assert_eq!(lock.ancestors, vec!["healthcare.hospital", "healthcare"]);

    let metadata = lock.metadata.unwrap();
    assert!(!metadata.heuristics_agree);
    assert!((metadata.schema_boost - 0.10).abs() < 1e-9);

    assert_eq!(
        resolver.rules().lookup_domain("riverside-health.org").as_deref(),
        Some("healthcare.hospital")
    );
    assert!(store
        .snapshot(PACKS_DOCUMENT_KEY)
        .unwrap()
        .contains("riverside-health.org"));
}
