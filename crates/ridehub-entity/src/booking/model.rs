//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use ridehub_core::types::Holder;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Seats are locked, awaiting payment.
    Pending,
    /// Paid; seats are recorded in the trip inventory.
    Confirmed,
    /// Cancelled (from pending via release/expiry is a hard delete instead).
    Cancelled,
    /// Terminal bookkeeping state after trip completion.
    Completed,
}

/// Passenger details for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Passenger full name.
    pub full_name: String,
    /// The seat this passenger occupies.
    pub seat_label: String,
    /// Optional identity document number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

/// One customer's attempt (or completed purchase) to occupy a set of seats
/// on one trip.
///
/// While `pending`, the booking is backed by seat locks in the lock store
/// and carries `hold_expires_at`. Confirmation moves the seats into the
/// trip inventory and clears the hold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: Uuid,
    /// Human-readable code, unique, used for guest lookup.
    pub code: String,
    /// The trip being booked.
    pub trip_id: Uuid,
    /// Authenticated holder, if any. Guests are identified by contact email.
    pub user_id: Option<Uuid>,
    /// Requested seat labels (1..=6, no duplicates).
    pub seats: Vec<String>,
    /// Per-seat passenger details.
    pub passengers: Json<Vec<Passenger>>,
    /// Contact name.
    pub contact_name: String,
    /// Contact email (also the guest identity).
    pub contact_email: String,
    /// Optional contact phone.
    pub contact_phone: Option<String>,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Hold expiry; present only while `pending`.
    pub hold_expires_at: Option<DateTime<Utc>>,
    /// Payment gateway reference, set at confirmation.
    pub payment_reference: Option<String>,
    /// Sum of seat prices, in cents.
    pub base_amount_cents: i64,
    /// Discount applied, in cents.
    pub discount_cents: i64,
    /// Final amount charged, in cents.
    pub total_amount_cents: i64,
    /// Loyalty points earned at confirmation.
    pub loyalty_points: i32,
    /// Cancellation reason, if cancelled.
    pub cancelled_reason: Option<String>,
    /// Who cancelled ("customer", "operator"), if cancelled.
    pub cancelled_by: Option<String>,
    /// Refund amount computed at cancellation, in cents.
    pub refund_amount_cents: Option<i64>,
    /// Refund execution status ("pending" | "not_applicable").
    pub refund_status: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// When the booking was confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// The holder identity for lock-ownership checks.
    pub fn holder(&self) -> Holder {
        match self.user_id {
            Some(user_id) => Holder::authenticated(user_id),
            None => Holder::guest(self.contact_email.clone()),
        }
    }

    /// Whether the booking is pending.
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Whether a pending booking's hold has lapsed.
    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.status, self.hold_expires_at) {
            (BookingStatus::Pending, Some(expiry)) => expiry <= now,
            _ => false,
        }
    }

    /// Whether the booking constitutes a live claim on its seats.
    ///
    /// A live claim is a pending booking whose hold has not expired, or a
    /// confirmed/completed booking.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Pending => !self.is_hold_expired(now),
            BookingStatus::Confirmed | BookingStatus::Completed => true,
            BookingStatus::Cancelled => false,
        }
    }

    /// Seconds of hold remaining (zero once expired or not pending).
    pub fn remaining_hold_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.hold_expires_at
            .map(|expiry| (expiry - now).num_seconds().max(0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn booking(status: BookingStatus, hold_expires_at: Option<DateTime<Utc>>) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            code: "RH-7K2M9P".to_string(),
            trip_id: Uuid::new_v4(),
            user_id: None,
            seats: vec!["A1".into()],
            passengers: Json(vec![Passenger {
                full_name: "Linh Tran".to_string(),
                seat_label: "A1".to_string(),
                document_number: None,
            }]),
            contact_name: "Linh Tran".to_string(),
            contact_email: "linh@example.com".to_string(),
            contact_phone: None,
            status,
            hold_expires_at,
            payment_reference: None,
            base_amount_cents: 45_000,
            discount_cents: 0,
            total_amount_cents: 45_000,
            loyalty_points: 0,
            cancelled_reason: None,
            cancelled_by: None,
            refund_amount_cents: None,
            refund_status: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
        }
    }

    #[test]
    fn guest_booking_derives_guest_holder() {
        let b = booking(BookingStatus::Pending, Some(Utc::now() + Duration::minutes(15)));
        assert_eq!(b.holder().key(), "guest:linh@example.com");
    }

    #[test]
    fn hold_expiry_applies_only_to_pending() {
        let now = Utc::now();
        let expired = booking(BookingStatus::Pending, Some(now - Duration::minutes(1)));
        assert!(expired.is_hold_expired(now));
        assert!(!expired.is_live(now));

        let confirmed = booking(BookingStatus::Confirmed, None);
        assert!(!confirmed.is_hold_expired(now));
        assert!(confirmed.is_live(now));
    }

    #[test]
    fn remaining_hold_seconds_floors_at_zero() {
        let now = Utc::now();
        let expired = booking(BookingStatus::Pending, Some(now - Duration::minutes(1)));
        assert_eq!(expired.remaining_hold_seconds(now), 0);

        let live = booking(BookingStatus::Pending, Some(now + Duration::minutes(10)));
        let remaining = live.remaining_hold_seconds(now);
        assert!(remaining > 590 && remaining <= 600);
    }
}
