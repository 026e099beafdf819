use crate::config::settings::{ClassifierSettings, FusionWeights};
use crate::core::heuristics::{score_domain_tokens, score_patterns};
use crate::core::signals::{extract_signals, HomepageSignals};
use crate::core::taxonomy::Taxonomy;
use crate::domain::model::{
    sort_votes, AltClassification, ClassifyEvidence, ClassifyRequest, ClassifyResult,
    HeuristicVote, PrimaryClassification,
};
use crate::domain::ports::IndustryClassifier;
use crate::utils::error::{IndustryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;

pub const MODEL_VERSION: &str = "heuristic-fusion-v1";
pub const PRIMARY_SOURCE: &str = "ai_worker";
pub const MAX_ALTS: usize = 3;

/// Homepage-fetching classifier that fuses the pattern and domain-token scorers.
pub struct AiClassifierClient {
    client: Client,
    taxonomy: Taxonomy,
    settings: ClassifierSettings,
}

impl AiClassifierClient {
    pub fn new(taxonomy: Taxonomy, settings: ClassifierSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            taxonomy,
            settings,
        })
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// 抓取首頁 HTML；非 2xx 視為錯誤
    async fn fetch_homepage(&self, url: &str) -> Result<String> {
        tracing::debug!("🌐 Fetching homepage: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.settings.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndustryError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Homepage signals for the request, or a minimal bundle when the page is unavailable.
    async fn gather_signals(&self, request: &ClassifyRequest) -> HomepageSignals {
        let keywords = request.keywords.clone();
        let description = request.site_description.clone();

        let skip_fetch = !self.settings.fetch_homepage || request.crawl_budget == Some(0);
        if skip_fetch || request.root_url.trim().is_empty() {
            return HomepageSignals::minimal(description, keywords);
        }

        match self.fetch_homepage(&request.root_url).await {
            Ok(html) => extract_signals(&html).with_caller_hints(description, keywords),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Homepage fetch failed for {}, classifying without it: {}",
                    request.root_url,
                    e
                );
                HomepageSignals::minimal(description, keywords)
            }
        }
    }

    /// 以已取得的訊號進行分類（不做網路請求）
    pub fn classify_signals(&self, domain: &str, signals: &HomepageSignals) -> ClassifyResult {
        let pattern_votes = score_patterns(&self.taxonomy, &signals.text_corpus(domain));
        let domain_votes = score_domain_tokens(&self.taxonomy, domain);

        tracing::debug!(
            "🧮 {}: pattern votes {:?}, domain votes {:?}",
            domain,
            pattern_votes.iter().map(|v| (&v.key, v.score)).collect::<Vec<_>>(),
            domain_votes.iter().map(|v| (&v.key, v.score)).collect::<Vec<_>>()
        );

        let mut fused = fuse_scores(&pattern_votes, &domain_votes, &self.settings.weights);
        if fused.is_empty() {
            tracing::debug!(
                "🤷 {}: no positive scores, falling back to {}",
                domain,
                self.settings.fallback_industry
            );
            fused.push(HeuristicVote {
                key: self.settings.fallback_industry.clone(),
                score: self.settings.fallback_score,
                signals: vec!["fallback".to_string()],
            });
        }

        let primary = &fused[0];
        let alts = fused
            .iter()
            .skip(1)
            .take(MAX_ALTS)
            .map(|v| AltClassification {
                industry_key: v.key.clone(),
                confidence: v.score,
            })
            .collect();

        let domain_signals: Vec<String> = domain_votes
            .iter()
            .flat_map(|v| v.signals.iter().cloned())
            .collect();
        let non_empty = |items: &[String]| (!items.is_empty()).then(|| items.to_vec());

        ClassifyResult {
            primary: PrimaryClassification {
                industry_key: primary.key.clone(),
                confidence: primary.score.clamp(0.0, 1.0),
                source: PRIMARY_SOURCE.to_string(),
            },
            alts,
            evidence: ClassifyEvidence {
                title: signals.title.clone(),
                nav: non_empty(&signals.nav_terms),
                schema: non_empty(&signals.schema_types),
                keywords: non_empty(&signals.keywords),
                domain_signals: non_empty(&domain_signals),
            },
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl IndustryClassifier for AiClassifierClient {
    async fn classify(&self, request: &ClassifyRequest) -> Result<ClassifyResult> {
        let signals = self.gather_signals(request).await;
        let result = self.classify_signals(&request.domain, &signals);

        tracing::info!(
            "🤖 Classified {} as {} ({:.2})",
            request.domain,
            result.primary.industry_key,
            result.primary.confidence
        );
        Ok(result)
    }
}

/// 合併兩個 scorer 的分數：pattern × w1 + domain × w2 + reserved × 0
///
/// 只回傳分數大於 0 的產業，依分數由高到低排序。
pub fn fuse_scores(
    pattern_votes: &[HeuristicVote],
    domain_votes: &[HeuristicVote],
    weights: &FusionWeights,
) -> Vec<HeuristicVote> {
    let reserved_score = 0.0;
    let mut combined: BTreeMap<&str, (f64, f64, Vec<String>)> = BTreeMap::new();

    for vote in pattern_votes {
        let entry = combined.entry(vote.key.as_str()).or_default();
        entry.0 = vote.score;
        entry.2.extend(vote.signals.iter().cloned());
    }
    for vote in domain_votes {
        let entry = combined.entry(vote.key.as_str()).or_default();
        entry.1 = vote.score;
        entry.2.extend(vote.signals.iter().map(|s| format!("domain:{}", s)));
    }

    let mut fused: Vec<HeuristicVote> = combined
        .into_iter()
        .map(|(key, (pattern, domain, signals))| HeuristicVote {
            key: key.to_string(),
            score: weights.pattern * pattern + weights.domain * domain + weights.reserved * reserved_score,
            signals,
        })
        .filter(|v| v.score > 0.0)
        .collect();

    sort_votes(&mut fused);
    fused
}
