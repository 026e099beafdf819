pub mod canary;
pub mod catalog;
pub mod classifier;
pub mod heuristics;
pub mod intent_filter;
pub mod resolver;
pub mod rule_store;
pub mod signals;
pub mod taxonomy;

pub use crate::domain::model::{ClassifyRequest, ClassifyResult, IndustryLock, LockSource, QueryIntent};
pub use crate::domain::ports::{IndustryClassifier, KvStore};
pub use crate::utils::error::Result;
