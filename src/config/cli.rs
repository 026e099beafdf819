use crate::config::toml_config::ResolverConfig;
use crate::core::resolver::ResolveContext;
use crate::domain::model::{ExistingLock, LockSource};
use crate::utils::domain::{extract_domain, root_url_for};
use crate::utils::error::{IndustryError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_unit_interval,
    validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "industry-lock")]
#[command(about = "Resolve and lock the industry of a website")]
pub struct CliConfig {
    /// Domain or URL to resolve (e.g. toyota.com)
    #[arg(long)]
    pub domain: String,

    /// Homepage URL; defaults to https://<domain>/
    #[arg(long)]
    pub root_url: Option<String>,

    #[arg(long)]
    pub site_description: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Explicit industry override
    #[arg(long = "override")]
    pub override_industry: Option<String>,

    #[arg(long)]
    pub project_override: Option<String>,

    /// Industry already locked on the audit
    #[arg(long, requires = "existing_source")]
    pub existing_lock: Option<String>,

    /// Source recorded with `--existing-lock`
    #[arg(long, requires = "existing_lock")]
    pub existing_source: Option<LockSource>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    /// Intents to filter after resolution (.json array or .txt, one per line)
    #[arg(long)]
    pub intents: Option<String>,

    #[arg(long, help = "Skip the classifier step")]
    pub no_ai: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入 TOML 配置並套用 CLI 旗標
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        let mut config = match &self.config {
            Some(path) => ResolverConfig::from_file(path)?,
            None => ResolverConfig::default(),
        };
        if self.no_ai {
            config.resolver.ai_enabled = Some(false);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn resolve_context(&self) -> ResolveContext {
        let domain = extract_domain(&self.domain);
        let root_url = self
            .root_url
            .clone()
            .unwrap_or_else(|| root_url_for(&domain));

        let mut ctx = ResolveContext::for_domain(domain).with_root_url(root_url);
        ctx.override_industry = self.override_industry.clone();
        ctx.project_override = self.project_override.clone();
        ctx.site_description = self.site_description.clone();
        ctx.signals.site_description = self.site_description.clone();
        ctx.signals.keywords = self.keywords.clone();
        ctx.existing_lock = self
            .existing_lock
            .clone()
            .zip(self.existing_source)
            .map(|(value, source)| ExistingLock { value, source });
        ctx
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("domain", &self.domain)?;
        if extract_domain(&self.domain).is_empty() {
            return Err(IndustryError::InvalidConfigValueError {
                field: "domain".to_string(),
                value: self.domain.clone(),
                reason: "Not a recognizable domain or URL".to_string(),
            });
        }
        if let Some(root_url) = &self.root_url {
            validate_url("root_url", root_url)?;
        }
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        if let Some(path) = &self.intents {
            validate_file_extensions("intents", std::slice::from_ref(path), &["json", "txt"])?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "industry-canary")]
#[command(about = "Run the industry canary suite through the full resolver")]
pub struct CanaryCliConfig {
    /// CSV with `domain,expected_industry` columns; built-in table when omitted
    #[arg(long)]
    pub cases: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    /// Minimum pass rate (0-1) for a zero exit code
    #[arg(long, default_value = "1.0")]
    pub min_pass_rate: f64,

    #[arg(long, help = "Skip the classifier step")]
    pub no_ai: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CanaryCliConfig {
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        let mut config = match &self.config {
            Some(path) => ResolverConfig::from_file(path)?,
            None => ResolverConfig::default(),
        };
        if self.no_ai {
            config.resolver.ai_enabled = Some(false);
        }
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CanaryCliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.cases {
            validate_file_extensions("cases", std::slice::from_ref(path), &["csv"])?;
        }
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        validate_unit_interval("min_pass_rate", self.min_pass_rate)
    }
}
