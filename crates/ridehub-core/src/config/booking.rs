//! Booking lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Booking lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// How long a hold keeps seats reserved, in minutes.
    #[serde(default = "default_hold_minutes")]
    pub hold_minutes: i64,
    /// Maximum number of seats in a single booking.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_booking: usize,
    /// Cents of final total per loyalty point earned at confirmation.
    #[serde(default = "default_loyalty_cents_per_point")]
    pub loyalty_cents_per_point: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            hold_minutes: default_hold_minutes(),
            max_seats_per_booking: default_max_seats(),
            loyalty_cents_per_point: default_loyalty_cents_per_point(),
        }
    }
}

fn default_hold_minutes() -> i64 {
    15
}

fn default_max_seats() -> usize {
    6
}

fn default_loyalty_cents_per_point() -> i64 {
    1000
}
