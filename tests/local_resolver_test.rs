use industry_lock::adapters::kv::FileKvStore;
use industry_lock::core::canary::{run_canary, CanaryCase};
use industry_lock::core::catalog::PACKS_DOCUMENT_KEY;
use industry_lock::core::resolver::ResolveContext;
use industry_lock::domain::model::LockSource;
use industry_lock::domain::ports::KvStore;
use industry_lock::{build_local_resolver, ResolverConfig};
use tempfile::TempDir;

async fn cache_with_default(default_industry: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let document = format!(
        r#"{{"industry_rules": {{"domains": {{}}, "default_industry": "{}"}}}}"#,
        default_industry
    );
    FileKvStore::new(temp_dir.path())
        .put(PACKS_DOCUMENT_KEY, &document)
        .await
        .unwrap();
    temp_dir
}

fn offline_config(cache_dir: &TempDir, extra: &str) -> ResolverConfig {
    let toml_content = format!(
        "[classifier]\nfetch_homepage = false\n{}\n[cache]\npath = \"{}\"\n",
        extra,
        cache_dir.path().display()
    );
    ResolverConfig::from_toml_str(&toml_content).unwrap()
}

#[tokio::test]
async fn test_classifier_fallback_uses_cache_document_default() {
    let cache_dir = cache_with_default("software.saas").await;
    let resolver = build_local_resolver(&offline_config(&cache_dir, "")).await.unwrap();

    assert_eq!(resolver.rules().default_industry(), "software.saas");
    assert_eq!(resolver.classifier().settings().fallback_industry, "software.saas");

    let ctx = ResolveContext::for_domain("zzyzx.org").with_root_url("https://zzyzx.org/");
    let lock = resolver.resolve(&ctx).await;
    assert_eq!(lock.value, "software.saas");
    assert_eq!(lock.source, LockSource::AiWorkerMediumConf);

    let cases = vec![CanaryCase {
        domain: "zzyzx.org".to_string(),
        expected_industry: "software.saas".to_string(),
    }];
    let report = run_canary(&resolver, &cases).await;
    assert!(!report.no_generic_fallback);
}

#[tokio::test]
async fn test_explicit_classifier_default_wins() {
    let cache_dir = cache_with_default("software.saas").await;
    let config = offline_config(&cache_dir, "default_industry = \"finance.banking\"");
    let resolver = build_local_resolver(&config).await.unwrap();

    assert_eq!(resolver.classifier().settings().fallback_industry, "finance.banking");
}
