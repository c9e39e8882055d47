//! Trip entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trip_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Scheduled and open for booking until departure.
    Scheduled,
    /// Departed and under way.
    Ongoing,
    /// Arrived.
    Completed,
    /// Cancelled by the operator.
    Cancelled,
}

/// One scheduled departure of one vehicle on one route.
///
/// The trip row is the authoritative seat inventory: `booked_seats` is
/// mutated only through the booking lifecycle's confirm/cancel operations,
/// via single-statement conditional updates. Trips themselves are created
/// and scheduled by the trip-management collaborator, never by this
/// service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    /// Unique trip identifier.
    pub id: Uuid,
    /// The vehicle operating this trip.
    pub vehicle_id: Uuid,
    /// Route origin (display name).
    pub route_origin: String,
    /// Route destination (display name).
    pub route_destination: String,
    /// Scheduled departure time.
    pub departure_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Full seat layout of the vehicle, as labels.
    pub seat_labels: Vec<String>,
    /// Total seat count (always `seat_labels.len()`).
    pub total_seats: i32,
    /// Labels of permanently booked seats.
    pub booked_seats: Vec<String>,
    /// Derived available count (`total_seats - booked_seats.len()`).
    pub available_seats: i32,
    /// Price per seat, in cents.
    pub seat_price_cents: i64,
    /// When the trip row was created.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Whether new holds may be placed on this trip.
    pub fn is_open_for_booking(&self, now: DateTime<Utc>) -> bool {
        self.status == TripStatus::Scheduled && self.departure_at > now
    }

    /// Requested labels that are not part of this trip's layout.
    pub fn unknown_seats(&self, seats: &[String]) -> Vec<String> {
        seats
            .iter()
            .filter(|s| !self.seat_labels.contains(s))
            .cloned()
            .collect()
    }

    /// Requested labels that are already permanently booked.
    pub fn already_booked(&self, seats: &[String]) -> Vec<String> {
        seats
            .iter()
            .filter(|s| self.booked_seats.contains(s))
            .cloned()
            .collect()
    }

    /// Whole hours remaining until departure (negative once departed).
    pub fn hours_until_departure(&self, now: DateTime<Utc>) -> i64 {
        (self.departure_at - now).num_hours()
    }
}
