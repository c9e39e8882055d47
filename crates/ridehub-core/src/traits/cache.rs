//! Cache provider trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Backend-agnostic cache operations.
///
/// Implementations must be safe for concurrent use from many tasks.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value by key.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with an explicit TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
