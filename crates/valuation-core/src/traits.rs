use async_trait::async_trait;
use crate::ValuationError;

/// Trait for the string key-value backend that saved analyses and the
/// disclaimer flag are persisted to.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ValuationError>;

    async fn set(&self, key: &str, value: String) -> Result<(), ValuationError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), ValuationError>;
}
