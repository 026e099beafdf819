use crate::core::catalog::{default_packs, DEFAULT_DOMAIN_RULES, DEFAULT_INDUSTRY};
use crate::core::taxonomy::Taxonomy;
use crate::domain::model::{DomainRules, IndustryKey, IntentPack};
use crate::domain::ports::KvStore;
use crate::utils::domain::normalize_domain;
use crate::utils::error::{IndustryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::RwLock;

/// 快取文件 `industry_packs_json` 中的規則區塊
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSection {
    #[serde(default)]
    pub domains: BTreeMap<String, String>,
    #[serde(default)]
    pub default_industry: Option<String>,
}

/// 快取文件的已知欄位；其餘欄位在讀取時忽略，寫回時原樣保留
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacksDocument {
    #[serde(default)]
    pub industry_rules: Option<RulesSection>,
    #[serde(default)]
    pub packs: Option<BTreeMap<String, IntentPack>>,
}

/// Allow/deny sets of a pack after inheritance is flattened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedPack {
    pub allow: BTreeSet<String>,
    pub deny: BTreeSet<String>,
}

/// Intent packs keyed by canonical industry key.
#[derive(Debug, Clone, Default)]
pub struct PackCatalog {
    packs: BTreeMap<IndustryKey, IntentPack>,
}

impl PackCatalog {
    pub fn new(packs: BTreeMap<IndustryKey, IntentPack>) -> Self {
        Self { packs }
    }

    pub fn get(&self, key: &str) -> Option<&IntentPack> {
        self.packs.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IndustryKey> {
        self.packs.keys()
    }

    /// 以 DFS 展開 `inherits`，visited 集合避免循環
    ///
    /// 找不到的 pack 視為空集合。
    pub fn flatten(&self, key: &str) -> FlattenedPack {
        let mut flat = FlattenedPack::default();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![key];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(pack) = self.packs.get(current) else {
                continue;
            };

            flat.allow
                .extend(pack.allow_tags.iter().map(|t| t.trim().to_lowercase()));
            if let Some(deny) = &pack.deny_phrases {
                flat.deny.extend(deny.iter().map(|p| p.trim().to_lowercase()));
            }
            if let Some(parents) = &pack.inherits {
                for parent in parents.iter().rev() {
                    if !visited.contains(parent.as_str()) {
                        stack.push(parent.as_str());
                    }
                }
            }
        }

        flat.allow.retain(|t| !t.is_empty());
        flat.deny.retain(|p| !p.is_empty());
        flat
    }
}

/// Domain rules, default industry and intent packs for the process.
///
/// Built once via [`RuleStore::load`]; a constructed store is always loaded.
/// Domain rules are appended to by the resolver's write-back, everything else
/// is read-only.
pub struct RuleStore<K: KvStore> {
    store: K,
    document_key: String,
    taxonomy: Taxonomy,
    rules: RwLock<DomainRules>,
    packs: PackCatalog,
}

impl<K: KvStore> RuleStore<K> {
    /// Compiled-in defaults only; the store is still used for write-back.
    pub fn with_defaults(store: K, document_key: impl Into<String>) -> Self {
        let taxonomy = Taxonomy::compiled();
        let domains = DEFAULT_DOMAIN_RULES
            .iter()
            .map(|(d, k)| (normalize_domain(d), taxonomy.normalize_key(k)))
            .collect();

        Self {
            store,
            document_key: document_key.into(),
            taxonomy,
            rules: RwLock::new(DomainRules {
                domains,
                default_industry: DEFAULT_INDUSTRY.to_string(),
            }),
            packs: PackCatalog::new(default_packs()),
        }
    }

    /// 載入規則：先用內建預設，再以快取文件覆蓋
    ///
    /// 讀取或解析失敗時記錄警告並沿用內建預設，不回傳錯誤。
    pub async fn load(store: K, document_key: impl Into<String>) -> Self {
        let mut rule_store = Self::with_defaults(store, document_key);

        match rule_store.store.get(&rule_store.document_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<PacksDocument>(&raw) {
                Ok(document) => {
                    rule_store.apply_document(document);
                    tracing::info!(
                        "📚 Loaded industry rules from '{}' ({} domains, {} packs)",
                        rule_store.document_key,
                        rule_store.domain_count(),
                        rule_store.packs.packs.len()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Cache document '{}' is not valid JSON, using compiled defaults: {}",
                        rule_store.document_key,
                        e
                    );
                }
            },
            Ok(None) => {
                tracing::info!(
                    "📚 No cache document '{}', using compiled defaults",
                    rule_store.document_key
                );
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Failed to read cache document '{}', using compiled defaults: {}",
                    rule_store.document_key,
                    e
                );
            }
        }

        rule_store
    }

    fn apply_document(&mut self, document: PacksDocument) {
        let taxonomy = &self.taxonomy;
        let rules = self.rules.get_mut().unwrap_or_else(|e| e.into_inner());

        if let Some(section) = document.industry_rules {
            for (domain, industry) in section.domains {
                let domain = normalize_domain(&domain);
                if !domain.is_empty() {
                    rules.domains.insert(domain, taxonomy.normalize_key(&industry));
                }
            }
            if let Some(default_industry) = section.default_industry {
                rules.default_industry = taxonomy.normalize_key(&default_industry);
            }
        }

        if let Some(packs) = document.packs {
            for (key, mut pack) in packs {
                pack.inherits = pack
                    .inherits
                    .map(|parents| parents.iter().map(|p| taxonomy.normalize_key(p)).collect());
                self.packs.packs.insert(taxonomy.normalize_key(&key), pack);
            }
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn packs(&self) -> &PackCatalog {
        &self.packs
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    pub fn domain_rules(&self) -> DomainRules {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn default_industry(&self) -> IndustryKey {
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .default_industry
            .clone()
    }

    pub fn domain_count(&self) -> usize {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).domains.len()
    }

    /// Exact match after lower-casing and stripping `www.`.
    pub fn lookup_domain(&self, domain: &str) -> Option<IndustryKey> {
        let domain = normalize_domain(domain);
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .domains
            .get(&domain)
            .cloned()
    }

    pub fn flattened_pack(&self, industry: &str) -> FlattenedPack {
        self.packs.flatten(&self.taxonomy.normalize_key(industry))
    }

    /// 記住 domain -> industry：先更新記憶體中的規則，再盡力寫回快取文件
    ///
    /// 寫回是 read-modify-write，沒有交易；同時寫入時以最後寫入者為準。
    /// 任何失敗只記錄，不影響呼叫端。
    pub async fn remember_domain(&self, domain: &str, industry: &str) {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return;
        }

        {
            let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
            rules.domains.insert(domain.clone(), industry.to_string());
        }

        match self.persist_domain(&domain, industry).await {
            Ok(()) => tracing::info!("💾 Cached industry rule {} -> {}", domain, industry),
            Err(e) => tracing::warn!(
                "⚠️ Failed to write industry rule {} -> {} to '{}': {}",
                domain,
                industry,
                self.document_key,
                e
            ),
        }
    }

    async fn persist_domain(&self, domain: &str, industry: &str) -> Result<()> {
        let mut document = match self.store.get(&self.document_key).await? {
            Some(raw) => serde_json::from_str::<Value>(&raw)?,
            None => Value::Object(Map::new()),
        };

        let root = document
            .as_object_mut()
            .ok_or_else(|| IndustryError::CacheError {
                message: "cache document root is not an object".to_string(),
            })?;

        let default_industry = self.default_industry();
        let rules = root
            .entry("industry_rules")
            .or_insert_with(|| serde_json::json!({ "default_industry": default_industry }));
        let rules = rules.as_object_mut().ok_or_else(|| IndustryError::CacheError {
            message: "industry_rules is not an object".to_string(),
        })?;

        let domains = rules
            .entry("domains")
            .or_insert_with(|| Value::Object(Map::new()));
        let domains = domains.as_object_mut().ok_or_else(|| IndustryError::CacheError {
            message: "industry_rules.domains is not an object".to_string(),
        })?;
        domains.insert(domain.to_string(), Value::String(industry.to_string()));

        let serialized = serde_json::to_string(&document)?;
        self.store.put(&self.document_key, &serialized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::kv::MemoryKvStore;
    use crate::core::catalog::PACKS_DOCUMENT_KEY;

    fn pack(allow: &[&str], deny: &[&str], inherits: &[&str]) -> IntentPack {
        IntentPack {
            allow_tags: allow.iter().map(|s| s.to_string()).collect(),
            deny_phrases: Some(deny.iter().map(|s| s.to_string()).collect()),
            inherits: Some(inherits.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_flatten_tolerates_cycles() {
        let mut packs = BTreeMap::new();
        packs.insert("a".to_string(), pack(&["alpha"], &["no a"], &["b"]));
        packs.insert("b".to_string(), pack(&["beta"], &[], &["c"]));
        packs.insert("c".to_string(), pack(&["gamma", "alpha"], &["no c"], &["a"]));
        let catalog = PackCatalog::new(packs);

        let flat = catalog.flatten("a");
        let allow: Vec<&str> = flat.allow.iter().map(String::as_str).collect();
        let deny: Vec<&str> = flat.deny.iter().map(String::as_str).collect();
        assert_eq!(allow, vec!["alpha", "beta", "gamma"]);
        assert_eq!(deny, vec!["no a", "no c"]);
    }

    #[test]
    fn test_flatten_missing_pack_is_empty() {
        let catalog = PackCatalog::new(BTreeMap::new());
        assert_eq!(catalog.flatten("nothing"), FlattenedPack::default());
    }

    #[tokio::test]
    async fn test_load_without_document_uses_defaults() {
        let store = RuleStore::load(MemoryKvStore::new(), PACKS_DOCUMENT_KEY).await;
        assert_eq!(store.default_industry(), DEFAULT_INDUSTRY);
        assert_eq!(store.lookup_domain("WWW.Toyota.com"), Some("automotive.oem".to_string()));
        assert!(store.flattened_pack("automotive_oem").deny.contains("cart"));
    }

    #[tokio::test]
    async fn test_load_with_unreadable_store_uses_defaults() {
        let store = RuleStore::load(MemoryKvStore::failing_reads(), PACKS_DOCUMENT_KEY).await;
        assert_eq!(store.default_industry(), DEFAULT_INDUSTRY);
        assert_eq!(store.lookup_domain("toyota.com"), Some("automotive.oem".to_string()));
        assert!(!store.flattened_pack("automotive.oem").allow.is_empty());
    }

    #[tokio::test]
    async fn test_load_with_invalid_document_falls_back() {
        let kv = MemoryKvStore::new();
        kv.insert(PACKS_DOCUMENT_KEY, "{not json");
        let store = RuleStore::load(kv, PACKS_DOCUMENT_KEY).await;
        assert_eq!(store.default_industry(), DEFAULT_INDUSTRY);
        assert_eq!(store.lookup_domain("toyota.com"), Some("automotive.oem".to_string()));
    }

    #[tokio::test]
    async fn test_document_overrides_defaults() {
        let kv = MemoryKvStore::new();
        kv.insert(
            PACKS_DOCUMENT_KEY,
            r#"{
                "industry_rules": {
                    "domains": {"www.acme-pharma.com": "pharma", "toyota.com": "auto_dealer"},
                    "default_industry": "other"
                },
                "packs": {"pharma": {"allow_tags": ["dosage"], "inherits": ["healthcare"]}}
            }"#,
        );
        let store = RuleStore::load(kv, PACKS_DOCUMENT_KEY).await;

        assert_eq!(
            store.lookup_domain("acme-pharma.com"),
            Some("healthcare.pharmaceutical".to_string())
        );
        assert_eq!(
            store.lookup_domain("toyota.com"),
            Some("automotive.dealership".to_string())
        );
        assert_eq!(store.default_industry(), DEFAULT_INDUSTRY);

        let flat = store.flattened_pack("healthcare.pharmaceutical");
        assert!(flat.allow.contains("dosage"));
        assert!(flat.allow.contains("symptoms"));
        assert!(!flat.allow.contains("side_effects"));
    }

    #[tokio::test]
    async fn test_remember_domain_preserves_rest_of_document() {
        let kv = MemoryKvStore::new();
        kv.insert(
            PACKS_DOCUMENT_KEY,
            r#"{"industry_rules": {"domains": {"a.com": "generic"}, "default_industry": "generic"},
                "packs": {"generic": {"allow_tags": []}},
                "owner": "growth-team"}"#,
        );
        let store = RuleStore::load(kv.clone(), PACKS_DOCUMENT_KEY).await;

        store.remember_domain("www.Subaru.com", "automotive.oem").await;

        assert_eq!(store.lookup_domain("subaru.com"), Some("automotive.oem".to_string()));
        let raw = kv.snapshot(PACKS_DOCUMENT_KEY).unwrap();
        let document: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["industry_rules"]["domains"]["subaru.com"], "automotive.oem");
        assert_eq!(document["industry_rules"]["domains"]["a.com"], "generic");
        assert_eq!(document["owner"], "growth-team");
        assert!(document["packs"]["generic"].is_object());
    }

    #[tokio::test]
    async fn test_remember_domain_creates_document() {
        let kv = MemoryKvStore::new();
        let store = RuleStore::load(kv.clone(), PACKS_DOCUMENT_KEY).await;

        store.remember_domain("subaru.com", "automotive.oem").await;

        let raw = kv.snapshot(PACKS_DOCUMENT_KEY).unwrap();
        let document: PacksDocument = serde_json::from_str(&raw).unwrap();
        let rules = document.industry_rules.unwrap();
        assert_eq!(rules.domains.get("subaru.com").map(String::as_str), Some("automotive.oem"));
        assert_eq!(rules.default_industry.as_deref(), Some(DEFAULT_INDUSTRY));
    }

    #[tokio::test]
    async fn test_remember_domain_swallows_write_failure() {
        let kv = MemoryKvStore::failing_writes();
        let store = RuleStore::load(kv, PACKS_DOCUMENT_KEY).await;

        store.remember_domain("subaru.com", "automotive.oem").await;

        // 寫回失敗仍保留記憶體中的規則
        assert_eq!(store.lookup_domain("subaru.com"), Some("automotive.oem".to_string()));
    }
}
