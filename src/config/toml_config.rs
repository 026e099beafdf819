use crate::config::settings::{
    ClassifierSettings, FusionWeights, ResolverSettings, Thresholds, AI_TIMEOUT_SECONDS,
    DEFAULT_USER_AGENT, FETCH_TIMEOUT_SECONDS,
};
use crate::core::catalog::PACKS_DOCUMENT_KEY;
use crate::utils::error::{IndustryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_unit_interval,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CACHE_PATH: &str = "./.industry-cache";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub resolver: ResolverSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub thresholds: ThresholdsSection,
    #[serde(default)]
    pub fusion: FusionSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverSection {
    pub ai_enabled: Option<bool>,
    pub ai_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    pub fetch_homepage: Option<bool>,
    pub fetch_timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub default_industry: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdsSection {
    pub min_confidence: Option<f64>,
    pub high_confidence: Option<f64>,
    pub schema_boost: Option<f64>,
    pub agreement_boost: Option<f64>,
    pub heuristic_fallback: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusionSection {
    pub pattern_weight: Option<f64>,
    pub domain_weight: Option<f64>,
    pub reserved_weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSection {
    pub path: Option<String>,
    pub document_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

impl ResolverConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IndustryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| IndustryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INDUSTRY_CACHE_PATH})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let Ok(re) = Regex::new(r"\$\{([^}]+)\}") else {
            return content.to_string();
        };

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn ai_enabled(&self) -> bool {
        self.resolver.ai_enabled.unwrap_or(true)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver.ai_timeout_seconds.unwrap_or(AI_TIMEOUT_SECONDS))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.classifier
                .fetch_timeout_seconds
                .unwrap_or(FETCH_TIMEOUT_SECONDS),
        )
    }

    pub fn cache_path(&self) -> &str {
        self.cache.path.as_deref().unwrap_or(DEFAULT_CACHE_PATH)
    }

    pub fn document_key(&self) -> &str {
        self.cache.document_key.as_deref().unwrap_or(PACKS_DOCUMENT_KEY)
    }

    pub fn bind_address(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        let t = &self.thresholds;
        Thresholds {
            min_confidence: t.min_confidence.unwrap_or(defaults.min_confidence),
            high_confidence: t.high_confidence.unwrap_or(defaults.high_confidence),
            schema_boost: t.schema_boost.unwrap_or(defaults.schema_boost),
            agreement_boost: t.agreement_boost.unwrap_or(defaults.agreement_boost),
            heuristic_fallback: t.heuristic_fallback.unwrap_or(defaults.heuristic_fallback),
        }
    }

    pub fn fusion_weights(&self) -> FusionWeights {
        let defaults = FusionWeights::default();
        FusionWeights {
            pattern: self.fusion.pattern_weight.unwrap_or(defaults.pattern),
            domain: self.fusion.domain_weight.unwrap_or(defaults.domain),
            reserved: self.fusion.reserved_weight.unwrap_or(defaults.reserved),
        }
    }

    pub fn settings(&self) -> ResolverSettings {
        ResolverSettings {
            ai_enabled: self.ai_enabled(),
            ai_timeout: self.ai_timeout(),
            thresholds: self.thresholds(),
        }
    }

    /// 分類器設定；未指定 `default_industry` 時沿用規則庫的預設產業
    pub fn classifier_settings(&self, store_default_industry: &str) -> ClassifierSettings {
        ClassifierSettings {
            fetch_homepage: self.classifier.fetch_homepage.unwrap_or(true),
            fetch_timeout: self.fetch_timeout(),
            user_agent: self
                .classifier
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            fallback_industry: self
                .classifier
                .default_industry
                .clone()
                .unwrap_or_else(|| store_default_industry.to_string()),
            weights: self.fusion_weights(),
            ..ClassifierSettings::default()
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(seconds) = self.resolver.ai_timeout_seconds {
            validate_positive_number("resolver.ai_timeout_seconds", seconds as usize, 1)?;
        }
        if let Some(seconds) = self.classifier.fetch_timeout_seconds {
            validate_positive_number("classifier.fetch_timeout_seconds", seconds as usize, 1)?;
        }

        let t = self.thresholds();
        validate_unit_interval("thresholds.min_confidence", t.min_confidence)?;
        validate_unit_interval("thresholds.high_confidence", t.high_confidence)?;
        validate_unit_interval("thresholds.schema_boost", t.schema_boost)?;
        validate_unit_interval("thresholds.agreement_boost", t.agreement_boost)?;
        validate_unit_interval("thresholds.heuristic_fallback", t.heuristic_fallback)?;
        if t.min_confidence > t.high_confidence {
            return Err(IndustryError::InvalidConfigValueError {
                field: "thresholds.min_confidence".to_string(),
                value: t.min_confidence.to_string(),
                reason: "must not exceed thresholds.high_confidence".to_string(),
            });
        }

        let w = self.fusion_weights();
        validate_unit_interval("fusion.pattern_weight", w.pattern)?;
        validate_unit_interval("fusion.domain_weight", w.domain)?;
        validate_unit_interval("fusion.reserved_weight", w.reserved)?;

        validate_path("cache.path", self.cache_path())?;
        validate_non_empty_string("cache.document_key", self.document_key())?;
        if let Some(industry) = &self.classifier.default_industry {
            validate_non_empty_string("classifier.default_industry", industry)?;
        }

        Ok(())
    }
}

impl Validate for ResolverConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
