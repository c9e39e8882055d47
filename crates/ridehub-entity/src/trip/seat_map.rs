//! Derived per-seat availability view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Trip;

/// The availability state of one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    /// Free to hold.
    Available,
    /// Locked by a live hold.
    Held,
    /// Permanently booked.
    Booked,
}

/// A live seat lock, as reported by the lock store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldSeat {
    /// The locked seat label.
    pub seat: String,
    /// The lock owner's holder key.
    pub holder_key: String,
}

/// One entry of the seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatusEntry {
    /// The seat label.
    pub label: String,
    /// Its current state.
    pub state: SeatState,
}

/// The full availability picture for one trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMap {
    /// The trip this map describes.
    pub trip_id: Uuid,
    /// Monotonically increasing per-trip version; clients drop stale frames.
    pub version: u64,
    /// Count of seats neither booked nor held.
    pub available_seats: i64,
    /// Per-seat state, in layout order.
    pub seats: Vec<SeatStatusEntry>,
    /// When the map was computed.
    pub generated_at: DateTime<Utc>,
}

impl SeatMap {
    /// Compute the seat map from the inventory row and the live locks.
    ///
    /// A label that is both booked and still carries a lingering lock (a
    /// promotion that has not yet hit the lock TTL) reports `booked`.
    pub fn compute(trip: &Trip, held: &[HeldSeat], version: u64) -> Self {
        let seats: Vec<SeatStatusEntry> = trip
            .seat_labels
            .iter()
            .map(|label| {
                let state = if trip.booked_seats.contains(label) {
                    SeatState::Booked
                } else if held.iter().any(|h| &h.seat == label) {
                    SeatState::Held
                } else {
                    SeatState::Available
                };
                SeatStatusEntry {
                    label: label.clone(),
                    state,
                }
            })
            .collect();

        let available_seats = seats
            .iter()
            .filter(|s| s.state == SeatState::Available)
            .count() as i64;

        Self {
            trip_id: trip.id,
            version,
            available_seats,
            seats,
            generated_at: Utc::now(),
        }
    }

    /// The state of a single seat, if it exists in the layout.
    pub fn state_of(&self, label: &str) -> Option<SeatState> {
        self.seats
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.state)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::trip::model::TripStatus;

    use super::*;

    fn trip() -> Trip {
        let now = Utc::now();
        Trip {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            route_origin: "Hue".to_string(),
            route_destination: "Hoi An".to_string(),
            departure_at: now + Duration::hours(6),
            status: TripStatus::Scheduled,
            seat_labels: vec!["A1".into(), "A2".into(), "A3".into(), "B1".into()],
            total_seats: 4,
            booked_seats: vec!["A3".into()],
            available_seats: 3,
            seat_price_cents: 30_000,
            created_at: now,
            updated_at: now,
        }
    }

    fn held(seat: &str) -> HeldSeat {
        HeldSeat {
            seat: seat.to_string(),
            holder_key: "guest:x@example.com".to_string(),
        }
    }

    #[test]
    fn states_follow_inventory_and_locks() {
        let map = SeatMap::compute(&trip(), &[held("A1")], 1);
        assert_eq!(map.state_of("A1"), Some(SeatState::Held));
        assert_eq!(map.state_of("A2"), Some(SeatState::Available));
        assert_eq!(map.state_of("A3"), Some(SeatState::Booked));
        assert_eq!(map.available_seats, 2);
    }

    #[test]
    fn booked_wins_over_lingering_lock() {
        // A3 is booked but its promotion-era lock has not expired yet.
        let map = SeatMap::compute(&trip(), &[held("A3")], 2);
        assert_eq!(map.state_of("A3"), Some(SeatState::Booked));
    }

    #[test]
    fn unknown_label_reports_none() {
        let map = SeatMap::compute(&trip(), &[], 1);
        assert_eq!(map.state_of("Z9"), None);
    }
}
