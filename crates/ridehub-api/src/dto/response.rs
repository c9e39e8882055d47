//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ridehub_entity::{Booking, BookingStatus};

/// Refund information on a cancelled booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundInfo {
    /// Refund amount in cents.
    pub amount_cents: i64,
    /// Refund execution status.
    pub status: String,
}

/// Booking representation returned by every booking endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Booking identifier.
    pub booking_id: Uuid,
    /// Human-readable code for guest lookup.
    pub code: String,
    /// The booked trip.
    pub trip_id: Uuid,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Seat labels.
    pub seats: Vec<String>,
    /// Hold expiry (pending bookings only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_expires_at: Option<DateTime<Utc>>,
    /// Seconds of hold remaining (pending bookings only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    /// Base amount in cents.
    pub base_amount_cents: i64,
    /// Discount in cents.
    pub discount_cents: i64,
    /// Final amount in cents.
    pub total_amount_cents: i64,
    /// Loyalty points earned (confirmed bookings).
    pub loyalty_points: i32,
    /// Payment reference (confirmed bookings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Refund details (cancelled bookings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundInfo>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let now = Utc::now();
        let remaining_seconds = booking
            .hold_expires_at
            .map(|_| booking.remaining_hold_seconds(now));

        let refund = match (&booking.refund_amount_cents, &booking.refund_status) {
            (Some(amount), Some(status)) => Some(RefundInfo {
                amount_cents: *amount,
                status: status.clone(),
            }),
            _ => None,
        };

        Self {
            booking_id: booking.id,
            code: booking.code,
            trip_id: booking.trip_id,
            status: booking.status,
            hold_expires_at: booking.hold_expires_at,
            remaining_seconds,
            seats: booking.seats,
            base_amount_cents: booking.base_amount_cents,
            discount_cents: booking.discount_cents,
            total_amount_cents: booking.total_amount_cents,
            loyalty_points: booking.loyalty_points,
            payment_reference: booking.payment_reference,
            refund,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the process responds.
    pub status: String,
}

/// Readiness response probing the external stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness.
    pub ready: bool,
    /// Document store reachability.
    pub database: bool,
    /// Cache / lock store reachability.
    pub cache: bool,
}
