//! Industry resolution: the precedence chain that turns overrides, domain
//! rules, heuristics and the classifier into one [`IndustryLock`].
//!
//! Order, first match wins:
//! 1. explicit override argument
//! 2. project-level override
//! 3. lock already carried by the audit (re-emitted verbatim)
//! 4. domain rules (exact match, confidence 1.0)
//! 5. local pattern heuristics (computed, kept for steps 6 and 7)
//! 6. classifier, bounded by an outer timeout
//! 7. heuristics fallback
//! 8. default industry
//!
//! `resolve` never returns an error; every failure falls through to the next tier.

use crate::config::settings::ResolverSettings;
use crate::core::heuristics::score_patterns;
use crate::core::rule_store::RuleStore;
use crate::core::taxonomy::ancestors;
use crate::domain::model::{
    ClassifyRequest, ClassifyResult, ExistingLock, HeuristicVote, IndustryLock, IndustrySignals,
    LockMetadata, LockSource,
};
use crate::domain::ports::{IndustryClassifier, KvStore};
use crate::utils::domain::extract_domain;
use crate::utils::error::{IndustryError, Result};
use std::sync::Arc;

/// Everything known about an audit when resolution starts.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    pub existing_lock: Option<ExistingLock>,
    pub project_override: Option<String>,
    pub override_industry: Option<String>,
    pub signals: IndustrySignals,
    pub root_url: Option<String>,
    pub site_description: Option<String>,
}

impl ResolveContext {
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            signals: IndustrySignals::for_domain(domain),
            ..Default::default()
        }
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = Some(root_url.into());
        self
    }
}

pub struct IndustryResolver<K: KvStore, C: IndustryClassifier> {
    rules: Arc<RuleStore<K>>,
    classifier: C,
    settings: ResolverSettings,
}

impl<K: KvStore, C: IndustryClassifier> IndustryResolver<K, C> {
    pub fn new(rules: Arc<RuleStore<K>>, classifier: C, settings: ResolverSettings) -> Self {
        Self {
            rules,
            classifier,
            settings,
        }
    }

    pub fn rules(&self) -> &Arc<RuleStore<K>> {
        &self.rules
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn non_blank(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    fn lock(&self, value: String, source: LockSource, confidence: Option<f64>) -> IndustryLock {
        IndustryLock {
            ancestors: ancestors(&value),
            value,
            source,
            locked: true,
            confidence,
            metadata: None,
            votes: None,
        }
    }

    pub async fn resolve(&self, ctx: &ResolveContext) -> IndustryLock {
        let taxonomy = self.rules.taxonomy();
        let domain = extract_domain(&ctx.signals.domain);

        if let Some(value) = Self::non_blank(&ctx.override_industry) {
            tracing::info!("🔒 {}: explicit override -> {}", domain, value);
            return self.lock(taxonomy.normalize_key(value), LockSource::Override, None);
        }

        if let Some(value) = Self::non_blank(&ctx.project_override) {
            tracing::info!("🔒 {}: project override -> {}", domain, value);
            return self.lock(taxonomy.normalize_key(value), LockSource::Override, None);
        }

        if let Some(existing) = &ctx.existing_lock {
            if !existing.value.trim().is_empty() {
                tracing::debug!("🔒 {}: already locked as {}", domain, existing.value);
                return self.lock(existing.value.clone(), existing.source, None);
            }
        }

        if let Some(industry) = self.rules.lookup_domain(&domain) {
            tracing::info!("📖 {}: domain rule -> {}", domain, industry);
            return self.lock(taxonomy.normalize_key(&industry), LockSource::DomainRules, Some(1.0));
        }

        let signals = IndustrySignals {
            domain: domain.clone(),
            ..ctx.signals.clone()
        };
        let local_votes = score_patterns(taxonomy, &signals.text_corpus());
        let local_top = local_votes.first();

        if let Some(lock) = self.try_classifier(ctx, &domain, local_top, &local_votes).await {
            return lock;
        }

        if let Some(top) = local_top {
            if top.score >= self.settings.thresholds.heuristic_fallback {
                tracing::info!("🧩 {}: heuristics -> {} ({:.2})", domain, top.key, top.score);
                let mut lock = self.lock(
                    taxonomy.normalize_key(&top.key),
                    LockSource::Heuristics,
                    Some(top.score),
                );
                lock.votes = Some(local_votes.clone());
                return lock;
            }
        }

        let default_industry = self.rules.default_industry();
        tracing::info!("🏳️ {}: no confident signal, using default {}", domain, default_industry);
        let mut lock = self.lock(taxonomy.normalize_key(&default_industry), LockSource::Default, None);
        if !local_votes.is_empty() {
            lock.votes = Some(local_votes);
        }
        lock
    }

    async fn classify_with_timeout(&self, request: &ClassifyRequest) -> Result<ClassifyResult> {
        match tokio::time::timeout(self.settings.ai_timeout, self.classifier.classify(request)).await {
            Ok(result) => result,
            Err(_) => Err(IndustryError::ClassifierTimeout {
                seconds: self.settings.ai_timeout.as_secs(),
            }),
        }
    }

    /// Step 6. `None` means fall through to heuristics/default.
    async fn try_classifier(
        &self,
        ctx: &ResolveContext,
        domain: &str,
        local_top: Option<&HeuristicVote>,
        local_votes: &[HeuristicVote],
    ) -> Option<IndustryLock> {
        if !self.settings.ai_enabled {
            tracing::debug!("{}: classifier disabled", domain);
            return None;
        }
        let root_url = Self::non_blank(&ctx.root_url)?;

        let request = ClassifyRequest {
            domain: domain.to_string(),
            root_url: root_url.to_string(),
            site_description: ctx
                .site_description
                .clone()
                .or_else(|| ctx.signals.site_description.clone()),
            keywords: ctx.signals.keywords.clone(),
            crawl_budget: None,
        };

        let result = match self.classify_with_timeout(&request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("⚠️ {}: classifier failed, falling through: {}", domain, e);
                return None;
            }
        };

        let thresholds = &self.settings.thresholds;
        let raw_confidence = result.primary.confidence;
        if raw_confidence <= 0.0 {
            return None;
        }
        if raw_confidence < thresholds.min_confidence {
            tracing::info!(
                "📉 {}: classifier confidence {:.2} below floor {:.2}, ignoring {}",
                domain,
                raw_confidence,
                thresholds.min_confidence,
                result.primary.industry_key
            );
            return None;
        }

        let taxonomy = self.rules.taxonomy();
        let industry = taxonomy.normalize_key(&result.primary.industry_key);

        let expected = taxonomy.expected_schema_types(&industry);
        let schema_match = ctx
            .signals
            .schema_types
            .iter()
            .chain(result.evidence.schema.iter().flatten())
            .any(|t| expected.iter().any(|e| e.eq_ignore_ascii_case(t)));
        let schema_boost = if schema_match { thresholds.schema_boost } else { 0.0 };

        let heuristics_agree = local_top
            .map(|top| taxonomy.normalize_key(&top.key) == industry)
            .unwrap_or(false);
        let agreement_boost = if heuristics_agree {
            thresholds.agreement_boost
        } else {
            0.0
        };

        let confidence = (raw_confidence + schema_boost + agreement_boost).min(1.0);
        let source = if confidence >= thresholds.high_confidence {
            LockSource::AiWorker
        } else {
            LockSource::AiWorkerMediumConf
        };

        tracing::info!(
            "🤖 {}: classifier -> {} ({:.2} raw, {:.2} final, schema +{:.2}, agree {})",
            domain,
            industry,
            raw_confidence,
            confidence,
            schema_boost,
            heuristics_agree
        );

        if confidence >= thresholds.high_confidence {
            self.rules.remember_domain(domain, &industry).await;
        }

        let alts = result
            .alts
            .into_iter()
            .map(|mut alt| {
                alt.industry_key = taxonomy.normalize_key(&alt.industry_key);
                alt
            })
            .collect();

        let mut lock = self.lock(industry, source, Some(confidence));
        lock.metadata = Some(LockMetadata {
            alts,
            heuristics_agree,
            schema_boost,
            fusion_applied: heuristics_agree,
        });
        if !local_votes.is_empty() {
            lock.votes = Some(local_votes.to_vec());
        }
        Some(lock)
    }
}
