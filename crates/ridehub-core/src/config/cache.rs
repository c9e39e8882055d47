//! Cache and seat lock store configuration.

use serde::{Deserialize, Serialize};

/// Cache provider settings.
///
/// The same Redis instance backs both the generic cache and the seat lock
/// store; `provider = "memory"` switches both to single-node in-process
/// implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider: "redis" or "memory".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis connection URL (ignored for the memory provider).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Prefix applied to every key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Default TTL for cached values, in seconds.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// TTL for cached seat maps, in seconds.
    #[serde(default = "default_seat_map_ttl")]
    pub seat_map_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            default_ttl_seconds: default_ttl(),
            seat_map_ttl_seconds: default_seat_map_ttl(),
        }
    }
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "ridehub".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_seat_map_ttl() -> u64 {
    5
}
