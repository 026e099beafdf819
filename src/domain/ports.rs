use crate::domain::model::{ClassifyRequest, ClassifyResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key-value document store backing the rule/pack cache document.
///
/// No transactions: concurrent writers to the same key race and the last one wins.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str)
        -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait IndustryClassifier: Send + Sync {
    async fn classify(&self, request: &ClassifyRequest) -> Result<ClassifyResult>;
}
