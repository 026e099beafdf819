use async_trait::async_trait;
use industry_lock::adapters::kv::MemoryKvStore;
use industry_lock::config::settings::ResolverSettings;
use industry_lock::core::catalog::PACKS_DOCUMENT_KEY;
use industry_lock::core::resolver::{IndustryResolver, ResolveContext};
use industry_lock::core::rule_store::RuleStore;
use industry_lock::domain::model::{
    AuditIndustryFields, ClassifyEvidence, ClassifyRequest, ClassifyResult, ExistingLock,
    LockSource, PrimaryClassification,
};
use industry_lock::domain::ports::IndustryClassifier;
use industry_lock::utils::error::{IndustryError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Classifier double: fixed answer, optional delay, call counter.
struct StubClassifier {
    answer: Option<(String, f64)>,
    schema: Option<Vec<String>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl StubClassifier {
    fn answering(key: &str, confidence: f64) -> Self {
        Self {
            answer: Some((key.to_string(), confidence)),
            schema: None,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            answer: None,
            schema: None,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_schema(mut self, types: &[&str]) -> Self {
        self.schema = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl IndustryClassifier for StubClassifier {
    async fn classify(&self, _request: &ClassifyRequest) -> Result<ClassifyResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let (key, confidence) = self.answer.clone().ok_or(IndustryError::HttpStatus {
            status: 503,
            url: "https://worker.invalid/classify".to_string(),
        })?;

        Ok(ClassifyResult {
            primary: PrimaryClassification {
                industry_key: key,
                confidence,
                source: "ai_worker".to_string(),
            },
            alts: vec![],
            evidence: ClassifyEvidence {
                schema: self.schema.clone(),
                ..Default::default()
            },
            model_version: "stub".to_string(),
        })
    }
}

fn resolver_with(
    classifier: StubClassifier,
    settings: ResolverSettings,
) -> (IndustryResolver<MemoryKvStore, StubClassifier>, MemoryKvStore, Arc<AtomicUsize>) {
    let store = MemoryKvStore::new();
    let calls = Arc::clone(&classifier.calls);
    let rules = RuleStore::with_defaults(store.clone(), PACKS_DOCUMENT_KEY);
    (IndustryResolver::new(Arc::new(rules), classifier, settings), store, calls)
}

fn resolver(classifier: StubClassifier) -> (IndustryResolver<MemoryKvStore, StubClassifier>, MemoryKvStore, Arc<AtomicUsize>) {
    resolver_with(classifier, ResolverSettings::default())
}

fn ctx(domain: &str) -> ResolveContext {
    ResolveContext::for_domain(domain).with_root_url(format!("https://{}/", domain))
}

fn automotive_ctx(domain: &str) -> ResolveContext {
    let mut ctx = ctx(domain);
    ctx.signals.keywords = vec![
        "suv".to_string(),
        "msrp".to_string(),
        "dealers".to_string(),
        "towing".to_string(),
    ];
    ctx
}

#[tokio::test]
async fn test_explicit_override_wins_over_everything() {
    let (resolver, _, calls) = resolver(StubClassifier::answering("finance.banking", 0.99));
    let mut ctx = ctx("toyota.com");
    ctx.override_industry = Some("automotive_oem".to_string());
    ctx.project_override = Some("finance.banking".to_string());
    ctx.existing_lock = Some(ExistingLock {
        value: "healthcare.hospital".to_string(),
        source: LockSource::AiWorker,
    });

    let lock = resolver.resolve(&ctx).await;
    assert_eq!(lock.value, "automotive.oem");
    assert_eq!(lock.source, LockSource::Override);
    assert!(lock.locked);
    assert_eq!(lock.confidence, None);
    assert_eq!(lock.ancestors, vec!["automotive.oem", "automotive"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_project_override_beats_existing_lock() {
    let (resolver, _, _) = resolver(StubClassifier::failing());
    let mut ctx = ctx("example.com");
    ctx.project_override = Some("saas".to_string());
    ctx.existing_lock = Some(ExistingLock {
        value: "finance.banking".to_string(),
        source: LockSource::Heuristics,
    });

    let lock = resolver.resolve(&ctx).await;
    assert_eq!(lock.value, "software.saas");
    assert_eq!(lock.source, LockSource::Override);
}

#[tokio::test]
async fn test_blank_override_is_ignored() {
    let (resolver, _, _) = resolver(StubClassifier::failing());
    let mut ctx = ctx("toyota.com");
    ctx.override_industry = Some("   ".to_string());

    let lock = resolver.resolve(&ctx).await;
    assert_eq!(lock.source, LockSource::DomainRules);
}

#[tokio::test]
async fn test_existing_lock_is_idempotent() {
    let (resolver, _, calls) = resolver(StubClassifier::answering("software.saas", 0.95));
    let mut ctx = ctx("toyota.com");
    ctx.existing_lock = Some(ExistingLock {
        value: "finance.banking".to_string(),
        source: LockSource::AiWorkerMediumConf,
    });

    let first = resolver.resolve(&ctx).await;
    let second = resolver.resolve(&ctx).await;

    assert_eq!(first.value, "finance.banking");
    assert_eq!(first.source, LockSource::AiWorkerMediumConf);
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_domain_rule_locks_with_full_confidence() {
    let (resolver, _, calls) = resolver(StubClassifier::answering("software.saas", 0.95));

    let lock = resolver.resolve(&ctx("www.Toyota.com")).await;
    assert_eq!(lock.value, "automotive.oem");
    assert_eq!(lock.source, LockSource::DomainRules);
    assert_eq!(lock.confidence, Some(1.0));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let audit = AuditIndustryFields::from(&lock);
    assert_eq!(audit.industry, "automotive.oem");
    assert_eq!(audit.industry_source, "domain_rules");
    assert!(audit.industry_locked);
}

#[tokio::test]
async fn test_low_confidence_is_discarded() {
    let (resolver, _, calls) = resolver(StubClassifier::answering("software.saas", 0.20));

    let lock = resolver.resolve(&ctx("acme-widgets.com")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_ne!(lock.value, "software.saas");
    assert_eq!(lock.value, "generic");
    assert_eq!(lock.source, LockSource::Default);
}

#[tokio::test]
async fn test_medium_confidence_is_not_written_back() {
    let (resolver, store, calls) = resolver(StubClassifier::answering("finance.banking", 0.5));

    let lock = resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(lock.value, "finance.banking");
    assert_eq!(lock.source, LockSource::AiWorkerMediumConf);
    assert_eq!(lock.confidence, Some(0.5));
    assert!(resolver.rules().lookup_domain("zzyzx.org").is_none());
    assert!(store.snapshot(PACKS_DOCUMENT_KEY).is_none());

    resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_high_confidence_writes_back_and_short_circuits() {
    let (resolver, store, calls) = resolver(StubClassifier::answering("saas", 0.9));

    let first = resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(first.value, "software.saas");
    assert_eq!(first.source, LockSource::AiWorker);
    assert_eq!(first.confidence, Some(0.9));

    let persisted = store.snapshot(PACKS_DOCUMENT_KEY).expect("document written");
    let document: serde_json::Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(
        document["industry_rules"]["domains"]["zzyzx.org"],
        "software.saas"
    );

    let second = resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(second.value, "software.saas");
    assert_eq!(second.source, LockSource::DomainRules);
    assert_eq!(second.confidence, Some(1.0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_boosts_are_bounded_and_recorded() {
    let classifier = StubClassifier::answering("automotive.oem", 0.95).with_schema(&["Car"]);
    let (resolver, _, _) = resolver(classifier);

    let lock = resolver.resolve(&automotive_ctx("example-motors.net")).await;
    assert_eq!(lock.value, "automotive.oem");
    assert_eq!(lock.source, LockSource::AiWorker);
    assert_eq!(lock.confidence, Some(1.0));

    let metadata = lock.metadata.expect("classifier metadata");
    assert!(metadata.heuristics_agree);
    assert!(metadata.fusion_applied);
    assert!((metadata.schema_boost - 0.10).abs() < 1e-9);
    assert!(lock.votes.is_some());
}

#[tokio::test]
async fn test_agreement_boost_promotes_medium_confidence() {
    let (resolver, _, _) = resolver(StubClassifier::answering("automotive.oem", 0.56));

    let lock = resolver.resolve(&automotive_ctx("example-motors.net")).await;
    let confidence = lock.confidence.unwrap();
    assert!((confidence - 0.71).abs() < 1e-9);
    assert_eq!(lock.source, LockSource::AiWorker);
    assert!(resolver.rules().lookup_domain("example-motors.net").is_some());
}

#[tokio::test]
async fn test_classifier_timeout_falls_through_to_heuristics() {
    let settings = ResolverSettings {
        ai_timeout: Duration::from_millis(50),
        ..ResolverSettings::default()
    };
    let classifier =
        StubClassifier::answering("finance.banking", 0.99).with_delay(Duration::from_millis(500));
    let (resolver, _, calls) = resolver_with(classifier, settings);

    let lock = resolver.resolve(&automotive_ctx("example-motors.net")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(lock.value, "automotive.oem");
    assert_eq!(lock.source, LockSource::Heuristics);
    assert_eq!(lock.confidence, Some(1.0));
}

#[tokio::test]
async fn test_classifier_error_falls_through_to_default() {
    let (resolver, _, _) = resolver(StubClassifier::failing());

    let lock = resolver.resolve(&ctx("acme-widgets.com")).await;
    assert_eq!(lock.value, "generic");
    assert_eq!(lock.source, LockSource::Default);
    assert_eq!(lock.confidence, None);
    assert_eq!(lock.ancestors, vec!["generic"]);
}

#[tokio::test]
async fn test_disabled_classifier_is_never_called() {
    let settings = ResolverSettings {
        ai_enabled: false,
        ..ResolverSettings::default()
    };
    let (resolver, _, calls) = resolver_with(StubClassifier::answering("software.saas", 0.99), settings);

    let lock = resolver.resolve(&automotive_ctx("example-motors.net")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(lock.source, LockSource::Heuristics);
}

#[tokio::test]
async fn test_weak_heuristics_fall_to_default_with_votes() {
    let (resolver, _, _) = resolver(StubClassifier::failing());
    let mut ctx = ctx("acme-widgets.com");
    ctx.signals.keywords = vec!["suv".to_string()];

    let lock = resolver.resolve(&ctx).await;
    assert_eq!(lock.source, LockSource::Default);
    let votes = lock.votes.expect("local votes kept");
    assert_eq!(votes[0].key, "automotive.oem");
    assert!((votes[0].score - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_write_back_failure_keeps_in_memory_rule() {
    let store = MemoryKvStore::failing_writes();
    let rules = RuleStore::with_defaults(store, PACKS_DOCUMENT_KEY);
    let resolver = IndustryResolver::new(
        Arc::new(rules),
        StubClassifier::answering("finance.insurance", 0.8),
        ResolverSettings::default(),
    );

    let lock = resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(lock.source, LockSource::AiWorker);
    assert_eq!(
        resolver.rules().lookup_domain("zzyzx.org").as_deref(),
        Some("finance.insurance")
    );
}

#[tokio::test]
async fn test_unreadable_store_still_locks_and_remembers() {
    let rules = RuleStore::load(MemoryKvStore::failing_reads(), PACKS_DOCUMENT_KEY).await;
    let resolver = IndustryResolver::new(
        Arc::new(rules),
        StubClassifier::answering("finance.insurance", 0.9),
        ResolverSettings::default(),
    );

    let lock = resolver.resolve(&ctx("zzyzx.org")).await;
    assert_eq!(lock.source, LockSource::AiWorker);
    assert_eq!(lock.value, "finance.insurance");
    assert_eq!(
        resolver.rules().lookup_domain("zzyzx.org").as_deref(),
        Some("finance.insurance")
    );
}

#[tokio::test]
async fn test_url_shaped_domain_matches_domain_rule() {
    let (resolver, _, calls) = resolver(StubClassifier::answering("software.saas", 0.95));

    let lock = resolver.resolve(&ctx("https://www.toyota.com/rav4")).await;
    assert_eq!(lock.value, "automotive.oem");
    assert_eq!(lock.source, LockSource::DomainRules);
    assert_eq!(lock.confidence, Some(1.0));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
