//! Cancellation refund schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A computed refund for a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuote {
    /// Percentage of the paid total refunded.
    pub percent: i64,
    /// Refund amount in cents.
    pub amount_cents: i64,
}

/// Refund percentage by hours remaining until departure.
///
/// Tiers: >= 24h -> 90%, >= 12h -> 70%, >= 6h -> 50%, otherwise 0%.
pub fn refund_percent(hours_until_departure: i64) -> i64 {
    if hours_until_departure >= 24 {
        90
    } else if hours_until_departure >= 12 {
        70
    } else if hours_until_departure >= 6 {
        50
    } else {
        0
    }
}

/// Compute the refund for cancelling a paid booking at `now`.
pub fn quote(total_amount_cents: i64, departure_at: DateTime<Utc>, now: DateTime<Utc>) -> RefundQuote {
    let hours = (departure_at - now).num_hours();
    let percent = refund_percent(hours);
    RefundQuote {
        percent,
        amount_cents: total_amount_cents * percent / 100,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn tiers_match_schedule() {
        assert_eq!(refund_percent(30), 90);
        assert_eq!(refund_percent(24), 90);
        assert_eq!(refund_percent(23), 70);
        assert_eq!(refund_percent(12), 70);
        assert_eq!(refund_percent(11), 50);
        assert_eq!(refund_percent(6), 50);
        assert_eq!(refund_percent(5), 0);
        assert_eq!(refund_percent(0), 0);
        assert_eq!(refund_percent(-2), 0);
    }

    #[test]
    fn refund_is_monotone_in_time_to_departure() {
        let now = Utc::now();
        let total = 100_000;

        let at = |hours: i64| quote(total, now + Duration::hours(hours), now);

        assert!(at(30).percent >= at(10).percent);
        assert!(at(10).percent >= at(3).percent);
        assert_eq!(at(30).amount_cents, 90_000);
        assert_eq!(at(10).amount_cents, 50_000);
        assert_eq!(at(3).amount_cents, 0);
    }
}
