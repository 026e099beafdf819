use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical hierarchical industry key, e.g. `automotive.oem`.
pub type IndustryKey = String;

/// Per-audit evidence bundle. Rebuilt on every resolution attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndustrySignals {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_h1: Option<String>,
    #[serde(default)]
    pub schema_types: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub nav_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
}

impl IndustrySignals {
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// 所有訊號文字串接後轉小寫，供 pattern scorer 使用
    pub fn text_corpus(&self) -> String {
        let mut parts: Vec<&str> = vec![self.domain.as_str()];
        parts.extend(self.homepage_title.as_deref());
        parts.extend(self.homepage_h1.as_deref());
        parts.extend(self.site_description.as_deref());
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.extend(self.nav_terms.iter().map(String::as_str));
        parts.extend(self.schema_types.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// A scorer's opinion about one industry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeuristicVote {
    pub key: IndustryKey,
    pub score: f64,
    pub signals: Vec<String>,
}

/// Sort votes descending by score; ties break on key so output is stable.
pub fn sort_votes(votes: &mut [HeuristicVote]) {
    votes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrimaryClassification {
    pub industry_key: IndustryKey,
    pub confidence: f64,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AltClassification {
    pub industry_key: IndustryKey,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassifyEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_signals: Option<Vec<String>>,
}

/// Output of one classifier call. Never cached itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifyResult {
    pub primary: PrimaryClassification,
    pub alts: Vec<AltClassification>,
    pub evidence: ClassifyEvidence,
    pub model_version: String,
}

/// Input to the classifier client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassifyRequest {
    pub domain: String,
    pub root_url: String,
    #[serde(default)]
    pub site_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub crawl_budget: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockSource {
    Override,
    DomainRules,
    Heuristics,
    AiWorker,
    AiWorkerMediumConf,
    Default,
}

impl LockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::DomainRules => "domain_rules",
            Self::Heuristics => "heuristics",
            Self::AiWorker => "ai_worker",
            Self::AiWorkerMediumConf => "ai_worker_medium_conf",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for LockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "override" => Ok(Self::Override),
            "domain_rules" => Ok(Self::DomainRules),
            "heuristics" => Ok(Self::Heuristics),
            "ai_worker" => Ok(Self::AiWorker),
            "ai_worker_medium_conf" => Ok(Self::AiWorkerMediumConf),
            "default" => Ok(Self::Default),
            other => Err(format!("unknown industry source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LockMetadata {
    pub alts: Vec<AltClassification>,
    pub heuristics_agree: bool,
    pub schema_boost: f64,
    pub fusion_applied: bool,
}

/// The durable output of a resolution. `locked` is always true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryLock {
    pub value: IndustryKey,
    pub source: LockSource,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub ancestors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LockMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<HeuristicVote>>,
}

/// The lock an audit already carries, as read back from the caller's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingLock {
    pub value: IndustryKey,
    pub source: LockSource,
}

/// Fields the caller persists on the audit record after a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditIndustryFields {
    pub industry: IndustryKey,
    pub industry_source: String,
    pub industry_locked: bool,
}

impl From<&IndustryLock> for AuditIndustryFields {
    fn from(lock: &IndustryLock) -> Self {
        Self {
            industry: lock.value.clone(),
            industry_source: lock.source.to_string(),
            industry_locked: lock.locked,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntentPack {
    #[serde(default)]
    pub allow_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_phrases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<Vec<IndustryKey>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainRules {
    #[serde(default)]
    pub domains: BTreeMap<String, IndustryKey>,
    pub default_industry: IndustryKey,
}

/// A candidate query intent to be filtered against an industry pack.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryIntent {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QueryIntent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }
}
