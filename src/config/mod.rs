pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::{CanaryCliConfig, CliConfig};
pub use toml_config::ResolverConfig;

use crate::adapters::kv::FileKvStore;
use crate::core::classifier::AiClassifierClient;
use crate::core::resolver::IndustryResolver;
use crate::core::rule_store::RuleStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Resolver wired to the file-backed cache document and the homepage classifier.
pub type LocalResolver = IndustryResolver<FileKvStore, AiClassifierClient>;

/// 依配置組裝 resolver：載入快取文件、建立分類器
pub async fn build_local_resolver(config: &ResolverConfig) -> Result<LocalResolver> {
    let store = FileKvStore::new(config.cache_path());
    let rules = RuleStore::load(store, config.document_key()).await;
    tracing::info!(
        "📚 Rules loaded from {} ({} domains, default {})",
        config.cache_path(),
        rules.domain_count(),
        rules.default_industry()
    );

    let classifier_settings = config.classifier_settings(&rules.default_industry());
    let classifier = AiClassifierClient::new(rules.taxonomy().clone(), classifier_settings)?;
    Ok(IndustryResolver::new(Arc::new(rules), classifier, config.settings()))
}
