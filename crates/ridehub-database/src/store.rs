//! Store trait seams over trip and booking persistence.
//!
//! The booking service, sweeper, and broadcaster depend on these traits
//! rather than on concrete repositories, so their behavior is testable
//! against in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use ridehub_core::result::AppResult;
use ridehub_entity::{Booking, Trip};

/// Authoritative trip inventory access.
#[async_trait]
pub trait TripStore: Send + Sync + std::fmt::Debug {
    /// Find a trip by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>>;

    /// Atomically add `seats` to the trip's booked set.
    ///
    /// The append commits only if the trip is still scheduled, every label
    /// belongs to the layout, and none of the labels is already booked.
    /// Returns the updated trip, or `None` if the condition failed (a
    /// racing confirmation won, or the trip is no longer bookable).
    async fn commit_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>>;

    /// Atomically remove `seats` from the trip's booked set.
    ///
    /// Removing labels that are not booked is a no-op for those labels.
    /// Returns the updated trip, or `None` if the trip does not exist.
    async fn release_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>>;
}

/// Booking record access.
///
/// All state transitions are conditional single-statement updates guarded
/// on the current status, so concurrent callers cannot double-apply a
/// transition.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug {
    /// Find a booking by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Find a booking by its human-readable code.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Booking>>;

    /// Insert a new booking row.
    async fn create(&self, booking: &Booking) -> AppResult<Booking>;

    /// Push the hold expiry forward. Succeeds only while `pending`.
    async fn extend_hold(
        &self,
        id: Uuid,
        new_expiry: DateTime<Utc>,
    ) -> AppResult<Option<Booking>>;

    /// Mark the booking confirmed. Succeeds only while `pending`.
    async fn confirm(
        &self,
        id: Uuid,
        payment_reference: &str,
        loyalty_points: i32,
    ) -> AppResult<Option<Booking>>;

    /// Mark the booking cancelled. Succeeds only while `pending` or
    /// `confirmed`.
    async fn cancel(
        &self,
        id: Uuid,
        reason: &str,
        actor: &str,
        refund_amount_cents: i64,
        refund_status: &str,
    ) -> AppResult<Option<Booking>>;

    /// Hard-delete a booking row. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Pending bookings whose hold expiry has passed, oldest first.
    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Booking>>;
}
