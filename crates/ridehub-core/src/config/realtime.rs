//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Real-time engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound message buffer size.
    #[serde(default = "default_buffer_size")]
    pub channel_buffer_size: usize,
    /// Maximum trip subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
    /// Server keepalive ping interval, in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_buffer_size(),
            max_subscriptions_per_connection: default_max_subscriptions(),
            ping_interval_seconds: default_ping_interval(),
        }
    }
}

fn default_buffer_size() -> usize {
    64
}

fn default_max_subscriptions() -> usize {
    16
}

fn default_ping_interval() -> u64 {
    30
}
