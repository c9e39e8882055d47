//! Expiry sweeper configuration.

use serde::{Deserialize, Serialize};

/// Background sweeper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the sweeper is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum expired bookings reconciled per sweep cycle.
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            sweep_interval_seconds: default_sweep_interval(),
            sweep_batch_size: default_sweep_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_batch_size() -> i64 {
    200
}
