use crate::core::catalog::{IndustryProfile, DEFAULT_INDUSTRY, INDUSTRY_PROFILES, LEGACY_KEYS};
use crate::domain::model::IndustryKey;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// An industry profile with its pattern list compiled.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub key: IndustryKey,
    pub patterns: Vec<Regex>,
    pub anti_keywords: Vec<String>,
    pub domain_keywords: Vec<String>,
    pub schema_types: Vec<String>,
}

impl CompiledProfile {
    fn compile(profile: &IndustryProfile) -> Self {
        let patterns = profile
            .patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping invalid pattern for {}: {} ({})", profile.key, p, e);
                    None
                }
            })
            .collect();

        let owned = |items: &[&str]| items.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();

        Self {
            key: profile.key.to_string(),
            patterns,
            anti_keywords: owned(profile.anti_keywords),
            domain_keywords: owned(profile.domain_keywords),
            schema_types: profile.schema_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Eagerly compiled industry taxonomy: profiles, canonical keys and the legacy key table.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    profiles: Vec<CompiledProfile>,
    canonical: HashSet<String>,
    legacy: HashMap<String, String>,
}

impl Taxonomy {
    pub fn compiled() -> Self {
        Self::from_profiles(INDUSTRY_PROFILES)
    }

    pub fn from_profiles(profiles: &[IndustryProfile]) -> Self {
        let profiles: Vec<CompiledProfile> = profiles.iter().map(CompiledProfile::compile).collect();

        let canonical = profiles
            .iter()
            .flat_map(|p| ancestors(&p.key))
            .collect::<HashSet<_>>();

        let legacy = LEGACY_KEYS
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            profiles,
            canonical,
            legacy,
        }
    }

    pub fn profiles(&self) -> &[CompiledProfile] {
        &self.profiles
    }

    pub fn profile(&self, key: &str) -> Option<&CompiledProfile> {
        self.profiles.iter().find(|p| p.key == key)
    }

    pub fn is_canonical(&self, key: &str) -> bool {
        self.canonical.contains(key)
    }

    /// 將任意產業鍵轉成標準的階層式鍵
    ///
    /// 舊版扁平鍵透過對照表轉換；不認得的鍵只做小寫與空白處理後保留，不拒絕。
    pub fn normalize_key(&self, raw: &str) -> IndustryKey {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
        if key.is_empty() {
            return DEFAULT_INDUSTRY.to_string();
        }
        if self.canonical.contains(&key) {
            return key;
        }
        if let Some(mapped) = self.legacy.get(&key) {
            return mapped.clone();
        }
        key
    }

    /// schema.org types expected for `key`, empty when the industry has no profile.
    pub fn expected_schema_types(&self, key: &str) -> &[String] {
        self.profile(key)
            .map(|p| p.schema_types.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::compiled()
    }
}

/// Hierarchical path of a dotted key, most specific first.
pub fn ancestors(key: &str) -> Vec<String> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    (1..=parts.len())
        .rev()
        .map(|n| parts[..n].join("."))
        .collect()
}
