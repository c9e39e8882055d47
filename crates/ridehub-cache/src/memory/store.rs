//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use ridehub_core::result::AppResult;
use ridehub_core::traits::cache::CacheProvider;

/// In-memory cache provider using moka.
///
/// Entries carry their own deadline because callers set per-key TTLs; the
/// cache-level `time_to_live` only bounds the worst case.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache; values are (payload, deadline).
    cache: Cache<String, (String, Instant)>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache.
    pub fn new(max_capacity: u64, max_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(max_ttl)
            .build();

        Self { cache }
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(600))
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.cache.get(key).await {
            Some((value, deadline)) if deadline > Instant::now() => Ok(Some(value)),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
