pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CanaryCliConfig, CliConfig};

pub use adapters::kv::{FileKvStore, MemoryKvStore};
pub use config::{build_local_resolver, LocalResolver, ResolverConfig};
pub use core::{
    classifier::AiClassifierClient,
    intent_filter::filter_intents,
    resolver::{IndustryResolver, ResolveContext},
    rule_store::RuleStore,
};
pub use domain::model::{AuditIndustryFields, IndustryLock, LockSource, QueryIntent};
pub use utils::error::{IndustryError, Result};
