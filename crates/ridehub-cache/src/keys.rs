//! Cache key builders.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the application uses.

use uuid::Uuid;

/// Cache key for the computed seat map of a trip.
pub fn seat_map(trip_id: Uuid) -> String {
    format!("seatmap:{trip_id}")
}
