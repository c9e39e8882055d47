//! Booking lifecycle manager.
//!
//! Owns the `pending → {confirmed, cancelled}` / `confirmed → {cancelled,
//! completed}` state machine and coordinates the seat lock store with the
//! trip inventory so that only one live claim exists per seat at any time.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use ridehub_core::config::booking::BookingConfig;
use ridehub_core::error::AppError;
use ridehub_core::events::{AvailabilityAction, AvailabilityEvent, EventBus};
use ridehub_core::result::AppResult;
use ridehub_core::types::Holder;
use ridehub_database::{BookingStore, TripStore};
use ridehub_entity::booking::code::generate_booking_code;
use ridehub_entity::booking::refund;
use ridehub_entity::{Booking, BookingStatus, Json, Passenger, Trip};
use ridehub_lock::{LockOutcome, SeatLockManager};

/// Input to a hold request.
#[derive(Debug, Clone)]
pub struct HoldRequest {
    /// The trip to book.
    pub trip_id: Uuid,
    /// Requested seat labels.
    pub seats: Vec<String>,
    /// One passenger per requested seat.
    pub passengers: Vec<Passenger>,
    /// Contact name.
    pub contact_name: String,
    /// Contact email (also the guest identity).
    pub contact_email: String,
    /// Optional contact phone.
    pub contact_phone: Option<String>,
}

/// The booking lifecycle manager.
#[derive(Debug, Clone)]
pub struct BookingService {
    /// Trip inventory store.
    trips: Arc<dyn TripStore>,
    /// Booking record store.
    bookings: Arc<dyn BookingStore>,
    /// Seat lock manager.
    locks: Arc<dyn SeatLockManager>,
    /// Availability event bus.
    events: EventBus,
    /// Lifecycle tunables.
    config: BookingConfig,
}

impl BookingService {
    /// Create a new booking service.
    pub fn new(
        trips: Arc<dyn TripStore>,
        bookings: Arc<dyn BookingStore>,
        locks: Arc<dyn SeatLockManager>,
        events: EventBus,
        config: BookingConfig,
    ) -> Self {
        Self {
            trips,
            bookings,
            locks,
            events,
            config,
        }
    }

    /// The configured hold duration.
    fn hold_ttl(&self) -> Duration {
        Duration::from_secs((self.config.hold_minutes * 60) as u64)
    }

    /// Place a time-bounded hold on a set of seats.
    ///
    /// On success a `pending` booking exists, its seats are locked for the
    /// hold duration, and a `SeatsHeld` event is published. On any failure
    /// no partial state is left behind: lock acquisition is atomic in the
    /// store, and a failed booking insert releases the just-acquired locks
    /// before the error surfaces.
    pub async fn hold(&self, request: HoldRequest, holder: Holder) -> AppResult<Booking> {
        self.validate_hold(&request)?;

        let now = Utc::now();
        let trip = self
            .trips
            .find_by_id(request.trip_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trip not found"))?;

        if !trip.is_open_for_booking(now) {
            return Err(AppError::wrong_state("Trip is not open for booking"));
        }

        let unknown = trip.unknown_seats(&request.seats);
        if !unknown.is_empty() {
            return Err(AppError::validation(format!(
                "Unknown seats for this trip: {}",
                unknown.join(", ")
            )));
        }

        let already_booked = trip.already_booked(&request.seats);
        if !already_booked.is_empty() {
            return Err(AppError::seat_unavailable(&[], &already_booked));
        }

        // The lock store is the single source of truth for racing holds.
        let holder_key = holder.key();
        let outcome = self
            .locks
            .acquire(trip.id, &request.seats, &holder_key, self.hold_ttl())
            .await?;

        let expires_at = match outcome {
            LockOutcome::Acquired { expires_at } => expires_at,
            LockOutcome::Conflict { seats } => {
                return Err(AppError::seat_unavailable(&seats, &[]));
            }
        };

        let booking = self.build_pending_booking(&request, &holder, &trip, expires_at);

        let created = match self.create_with_code_retry(booking).await {
            Ok(created) => created,
            Err(e) => {
                // Compensating action: never leave seats locked with no
                // booking behind them.
                if let Err(release_err) = self
                    .locks
                    .release(trip.id, &request.seats, &holder_key)
                    .await
                {
                    error!(
                        trip_id = %trip.id,
                        seats = ?request.seats,
                        error = %release_err,
                        "Failed to release locks after booking insert failure"
                    );
                }
                return Err(e);
            }
        };

        info!(
            booking_id = %created.id,
            code = %created.code,
            trip_id = %trip.id,
            seats = ?created.seats,
            expires_at = %expires_at,
            "Hold placed"
        );

        self.events.publish(AvailabilityEvent::now(
            trip.id,
            Some(created.id),
            created.seats.clone(),
            AvailabilityAction::Held,
        ));

        Ok(created)
    }

    /// Extend a pending hold by another hold period from now.
    pub async fn extend(&self, booking_id: Uuid, holder: &Holder) -> AppResult<Booking> {
        let now = Utc::now();
        let booking = self.find(booking_id).await?;

        if booking.holder().key() != holder.key() {
            return Err(AppError::wrong_state("Hold belongs to a different holder"));
        }
        if !booking.is_pending() {
            return Err(AppError::wrong_state("Only a pending hold can be extended"));
        }
        if booking.is_hold_expired(now) {
            return Err(AppError::hold_expired("Hold has already lapsed"));
        }

        let outcome = self
            .locks
            .extend(
                booking.trip_id,
                &booking.seats,
                &booking.holder().key(),
                self.hold_ttl(),
            )
            .await?;

        let expires_at = match outcome {
            LockOutcome::Acquired { expires_at } => expires_at,
            LockOutcome::Conflict { seats } => {
                // The locks lapsed in the store before the record did.
                return Err(AppError::hold_expired("Seat locks have lapsed")
                    .with_details(serde_json::json!({ "seats": seats })));
            }
        };

        let updated = self
            .bookings
            .extend_hold(booking_id, expires_at)
            .await?
            .ok_or_else(|| AppError::wrong_state("Hold was concluded concurrently"))?;

        info!(
            booking_id = %booking_id,
            expires_at = %expires_at,
            "Hold extended"
        );

        self.events.publish(AvailabilityEvent::now(
            updated.trip_id,
            Some(updated.id),
            updated.seats.clone(),
            AvailabilityAction::Extended,
        ));

        Ok(updated)
    }

    /// Release a pending hold.
    ///
    /// The booking record is hard-deleted: a released hold never existed
    /// from the inventory's perspective.
    pub async fn release(&self, booking_id: Uuid, holder: &Holder) -> AppResult<()> {
        let booking = self.find(booking_id).await?;

        if booking.holder().key() != holder.key() {
            return Err(AppError::wrong_state("Hold belongs to a different holder"));
        }
        if !booking.is_pending() {
            return Err(AppError::wrong_state("Only a pending hold can be released"));
        }

        self.locks
            .release(booking.trip_id, &booking.seats, &booking.holder().key())
            .await?;
        self.bookings.delete(booking_id).await?;

        info!(booking_id = %booking_id, trip_id = %booking.trip_id, "Hold released");

        self.events.publish(AvailabilityEvent::now(
            booking.trip_id,
            Some(booking.id),
            booking.seats.clone(),
            AvailabilityAction::Released,
        ));

        Ok(())
    }

    /// Confirm a pending booking after payment success.
    ///
    /// Idempotent under payment-gateway callback retries: confirming an
    /// already-confirmed booking with the same reference is a no-op
    /// success. Expiry is re-checked here, not trusted from hold time.
    pub async fn confirm(&self, booking_id: Uuid, payment_reference: &str) -> AppResult<Booking> {
        let now = Utc::now();
        let booking = self.find(booking_id).await?;

        match booking.status {
            BookingStatus::Confirmed => {
                return if booking.payment_reference.as_deref() == Some(payment_reference) {
                    info!(
                        booking_id = %booking_id,
                        "Duplicate confirmation callback ignored"
                    );
                    Ok(booking)
                } else {
                    Err(AppError::conflict(
                        "Booking already confirmed with a different payment reference",
                    ))
                };
            }
            BookingStatus::Cancelled | BookingStatus::Completed => {
                return Err(AppError::wrong_state(format!(
                    "Booking cannot be confirmed from its current state ({:?})",
                    booking.status
                )));
            }
            BookingStatus::Pending => {}
        }

        if booking.is_hold_expired(now) {
            return Err(AppError::hold_expired(
                "Hold lapsed before payment completed",
            ));
        }

        // (a) The inventory append is the final arbiter: zero rows matched
        // means a racing confirmation (possibly our own duplicate) won.
        let committed = self
            .trips
            .commit_seats(booking.trip_id, &booking.seats)
            .await?;

        if committed.is_none() {
            let fresh = self.find(booking_id).await?;
            if fresh.status == BookingStatus::Confirmed
                && fresh.payment_reference.as_deref() == Some(payment_reference)
            {
                return Ok(fresh);
            }
            return Err(AppError::seat_unavailable(&[], &booking.seats));
        }

        // (b) Record permanence on the booking.
        let loyalty_points =
            (booking.total_amount_cents / self.config.loyalty_cents_per_point.max(1)) as i32;
        let confirmed = self
            .bookings
            .confirm(booking_id, payment_reference, loyalty_points)
            .await?
            .ok_or_else(|| AppError::conflict("Booking was concluded concurrently"))?;

        // (c) Drop the short-lived locks now that permanence is recorded.
        // Failure here is tolerable: the locks lapse by TTL on their own.
        if let Err(e) = self
            .locks
            .promote(confirmed.trip_id, &confirmed.seats, &confirmed.holder().key())
            .await
        {
            warn!(
                booking_id = %booking_id,
                error = %e,
                "Failed to promote seat locks; they will lapse by TTL"
            );
        }

        info!(
            booking_id = %booking_id,
            trip_id = %confirmed.trip_id,
            seats = ?confirmed.seats,
            loyalty_points = loyalty_points,
            "Booking confirmed"
        );

        self.events.publish(AvailabilityEvent::now(
            confirmed.trip_id,
            Some(confirmed.id),
            confirmed.seats.clone(),
            AvailabilityAction::Booked,
        ));

        Ok(confirmed)
    }

    /// Cancel a pending or confirmed booking.
    ///
    /// The refund is computed from hours until departure; seats of a
    /// confirmed booking return to the trip inventory.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        reason: &str,
        actor: &str,
    ) -> AppResult<Booking> {
        let now = Utc::now();
        let booking = self.find(booking_id).await?;
        let trip = self
            .trips
            .find_by_id(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trip not found"))?;

        let (refund_cents, refund_status) = match booking.status {
            BookingStatus::Pending => {
                // Nothing was paid; free the locks and keep the record as
                // an actor-initiated cancellation.
                self.locks
                    .release(booking.trip_id, &booking.seats, &booking.holder().key())
                    .await?;
                (0, "not_applicable")
            }
            BookingStatus::Confirmed => {
                let quote = refund::quote(booking.total_amount_cents, trip.departure_at, now);
                if self
                    .trips
                    .release_seats(booking.trip_id, &booking.seats)
                    .await?
                    .is_none()
                {
                    return Err(AppError::not_found("Trip not found"));
                }
                (
                    quote.amount_cents,
                    if quote.amount_cents > 0 {
                        "pending"
                    } else {
                        "not_applicable"
                    },
                )
            }
            BookingStatus::Cancelled | BookingStatus::Completed => {
                return Err(AppError::wrong_state(format!(
                    "Booking cannot be cancelled from its current state ({:?})",
                    booking.status
                )));
            }
        };

        let cancelled = self
            .bookings
            .cancel(booking_id, reason, actor, refund_cents, refund_status)
            .await?
            .ok_or_else(|| AppError::wrong_state("Booking was concluded concurrently"))?;

        info!(
            booking_id = %booking_id,
            actor = %actor,
            refund_cents = refund_cents,
            "Booking cancelled"
        );

        self.events.publish(AvailabilityEvent::now(
            cancelled.trip_id,
            Some(cancelled.id),
            cancelled.seats.clone(),
            AvailabilityAction::Cancelled,
        ));

        Ok(cancelled)
    }

    /// Find a booking by id.
    pub async fn find(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))
    }

    /// Find a booking by its human-readable code (guest lookup).
    pub async fn find_by_code(&self, code: &str) -> AppResult<Booking> {
        self.bookings
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))
    }

    /// Structural validation, rejected before any lock attempt.
    fn validate_hold(&self, request: &HoldRequest) -> AppResult<()> {
        if request.seats.is_empty() {
            return Err(AppError::validation("At least one seat is required"));
        }
        if request.seats.len() > self.config.max_seats_per_booking {
            return Err(AppError::validation(format!(
                "At most {} seats per booking",
                self.config.max_seats_per_booking
            )));
        }

        let distinct: HashSet<&String> = request.seats.iter().collect();
        if distinct.len() != request.seats.len() {
            return Err(AppError::validation("Duplicate seat labels in request"));
        }

        if request.passengers.len() != request.seats.len() {
            return Err(AppError::validation(
                "Each requested seat needs exactly one passenger",
            ));
        }
        let covered: HashSet<&String> = request.passengers.iter().map(|p| &p.seat_label).collect();
        if covered != distinct {
            return Err(AppError::validation(
                "Passenger seat assignments must match the requested seats",
            ));
        }

        let email = request.contact_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid contact email is required"));
        }

        Ok(())
    }

    /// Assemble the pending booking row for a validated hold.
    fn build_pending_booking(
        &self,
        request: &HoldRequest,
        holder: &Holder,
        trip: &Trip,
        expires_at: chrono::DateTime<Utc>,
    ) -> Booking {
        let now = Utc::now();
        let base_amount_cents = trip.seat_price_cents * request.seats.len() as i64;

        Booking {
            id: Uuid::new_v4(),
            code: generate_booking_code(),
            trip_id: trip.id,
            user_id: holder.user_id(),
            seats: request.seats.clone(),
            passengers: Json(request.passengers.clone()),
            contact_name: request.contact_name.clone(),
            contact_email: request.contact_email.clone(),
            contact_phone: request.contact_phone.clone(),
            status: BookingStatus::Pending,
            hold_expires_at: Some(expires_at),
            payment_reference: None,
            base_amount_cents,
            discount_cents: 0,
            total_amount_cents: base_amount_cents,
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

    /// Insert the booking, retrying once with a fresh code on a collision.
    async fn create_with_code_retry(&self, mut booking: Booking) -> AppResult<Booking> {
        match self.bookings.create(&booking).await {
            Ok(created) => Ok(created),
            Err(first_err) => {
                booking.code = generate_booking_code();
                self.bookings.create(&booking).await.map_err(|_| first_err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use ridehub_core::events::AvailabilityAction;
    use ridehub_lock::MemorySeatLockManager;

    use crate::testing::{InMemoryBookingStore, InMemoryTripStore, scheduled_trip};

    use super::*;

    struct Fixture {
        service: BookingService,
        trips: Arc<InMemoryTripStore>,
        bookings: Arc<InMemoryBookingStore>,
        locks: Arc<MemorySeatLockManager>,
        events: EventBus,
        trip_id: Uuid,
    }

    fn passengers_for(seats: &[&str]) -> Vec<Passenger> {
        seats
            .iter()
            .map(|seat| Passenger {
                full_name: format!("Passenger {seat}"),
                seat_label: seat.to_string(),
                document_number: None,
            })
            .collect()
    }

    fn hold_request(trip_id: Uuid, seats: &[&str], email: &str) -> HoldRequest {
        HoldRequest {
            trip_id,
            seats: seats.iter().map(|s| s.to_string()).collect(),
            passengers: passengers_for(seats),
            contact_name: "Rider".to_string(),
            contact_email: email.to_string(),
            contact_phone: None,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_departure(ChronoDuration::hours(30)).await
    }

    async fn fixture_with_departure(departs_in: ChronoDuration) -> Fixture {
        let trip = scheduled_trip(&["A1", "A2", "A3"], departs_in);
        let trip_id = trip.id;

        let trips = Arc::new(InMemoryTripStore::with_trip(trip));
        let bookings = Arc::new(InMemoryBookingStore::new());
        let locks = Arc::new(MemorySeatLockManager::new());
        let events = EventBus::new(64);

        let service = BookingService::new(
            trips.clone(),
            bookings.clone(),
            locks.clone(),
            events.clone(),
            BookingConfig::default(),
        );

        Fixture {
            service,
            trips,
            bookings,
            locks,
            events,
            trip_id,
        }
    }

    #[tokio::test]
    async fn hold_creates_pending_booking_with_future_expiry() {
        let fx = fixture().await;
        let mut rx = fx.events.subscribe();

        let booking = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A1", "A2"], "x@example.com"),
                Holder::guest("x@example.com"),
            )
            .await
            .expect("hold");

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.hold_expires_at.expect("expiry") > Utc::now());
        assert_eq!(booking.base_amount_cents, 2 * 45_000);

        let held = fx.locks.held_seats(fx.trip_id).await.expect("held");
        assert_eq!(held.len(), 2);

        let event = rx.recv().await.expect("event");
        assert_eq!(event.action, AvailabilityAction::Held);
        assert_eq!(event.booking_id, Some(booking.id));
    }

    #[tokio::test]
    async fn hold_is_all_or_nothing_against_competing_hold() {
        let fx = fixture().await;

        fx.service
            .hold(
                hold_request(fx.trip_id, &["A2"], "first@example.com"),
                Holder::guest("first@example.com"),
            )
            .await
            .expect("first hold");

        let err = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A2", "A3"], "second@example.com"),
                Holder::guest("second@example.com"),
            )
            .await
            .expect_err("conflicting hold must fail");

        assert_eq!(err.kind, ridehub_core::error::ErrorKind::SeatUnavailable);
        let details = err.details.expect("details");
        assert_eq!(details["held_seats"], serde_json::json!(["A2"]));

        // A3 must remain free: the failed hold left nothing behind.
        let held = fx.locks.held_seats(fx.trip_id).await.expect("held");
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].seat, "A2");

        fx.service
            .hold(
                hold_request(fx.trip_id, &["A3"], "second@example.com"),
                Holder::guest("second@example.com"),
            )
            .await
            .expect("A3 is still available");
    }

    #[tokio::test]
    async fn hold_rejects_structural_problems_before_locking() {
        let fx = fixture().await;

        // Duplicate seats.
        let mut request = hold_request(fx.trip_id, &["A1", "A1"], "x@example.com");
        request.passengers = passengers_for(&["A1", "A1"]);
        let err = fx
            .service
            .hold(request, Holder::guest("x@example.com"))
            .await
            .expect_err("duplicates rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::Validation);

        // Passenger/seat mismatch.
        let mut request = hold_request(fx.trip_id, &["A1", "A2"], "x@example.com");
        request.passengers.pop();
        let err = fx
            .service
            .hold(request, Holder::guest("x@example.com"))
            .await
            .expect_err("mismatch rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::Validation);

        // Unknown seat label.
        let err = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["Z9"], "x@example.com"),
                Holder::guest("x@example.com"),
            )
            .await
            .expect_err("unknown label rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::Validation);

        // Nothing was locked by any of the failed attempts.
        assert!(fx.locks.held_seats(fx.trip_id).await.expect("held").is_empty());
    }

    #[tokio::test]
    async fn failed_booking_insert_releases_the_locks() {
        let fx = fixture().await;
        fx.bookings.fail_next_creates(2);

        let err = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A1"], "x@example.com"),
                Holder::guest("x@example.com"),
            )
            .await
            .expect_err("insert failure surfaces");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::Database);

        // Compensation ran: the seat is free again.
        assert!(fx.locks.held_seats(fx.trip_id).await.expect("held").is_empty());
        fx.service
            .hold(
                hold_request(fx.trip_id, &["A1"], "y@example.com"),
                Holder::guest("y@example.com"),
            )
            .await
            .expect("seat is available after compensation");
    }

    #[tokio::test]
    async fn confirm_moves_seats_into_inventory_and_is_idempotent() {
        let fx = fixture().await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(hold_request(fx.trip_id, &["A1", "A2"], "x@example.com"), holder)
            .await
            .expect("hold");

        let confirmed = fx
            .service
            .confirm(booking.id, "pay-123")
            .await
            .expect("confirm");
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.hold_expires_at.is_none());
        assert_eq!(confirmed.payment_reference.as_deref(), Some("pay-123"));
        assert_eq!(confirmed.loyalty_points, 90);

        let trip = fx
            .trips
            .find_by_id(fx.trip_id)
            .await
            .expect("find")
            .expect("trip");
        let mut booked = trip.booked_seats.clone();
        booked.sort();
        assert_eq!(booked, vec!["A1".to_string(), "A2".to_string()]);
        assert_eq!(trip.available_seats, 1);

        // Locks were promoted away.
        assert!(fx.locks.held_seats(fx.trip_id).await.expect("held").is_empty());

        // Duplicate gateway callback: no-op success, no duplicated seats.
        let again = fx
            .service
            .confirm(booking.id, "pay-123")
            .await
            .expect("duplicate confirm succeeds");
        assert_eq!(again.status, BookingStatus::Confirmed);

        let trip = fx
            .trips
            .find_by_id(fx.trip_id)
            .await
            .expect("find")
            .expect("trip");
        assert_eq!(trip.booked_seats.len(), 2);
        assert_eq!(trip.available_seats, 1);

        // A different reference on a confirmed booking is a conflict.
        let err = fx
            .service
            .confirm(booking.id, "pay-456")
            .await
            .expect_err("different reference rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn confirm_rechecks_expiry_at_confirmation_time() {
        let fx = fixture().await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(hold_request(fx.trip_id, &["A1"], "x@example.com"), holder)
            .await
            .expect("hold");

        // Simulate the hold lapsing between payment start and callback.
        fx.bookings
            .force_hold_expiry(booking.id, Utc::now() - ChronoDuration::minutes(1))
            .await;

        let err = fx
            .service
            .confirm(booking.id, "pay-123")
            .await
            .expect_err("expired hold cannot confirm");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::HoldExpired);

        // Inventory untouched.
        let trip = fx
            .trips
            .find_by_id(fx.trip_id)
            .await
            .expect("find")
            .expect("trip");
        assert!(trip.booked_seats.is_empty());
    }

    #[tokio::test]
    async fn release_hard_deletes_the_pending_booking() {
        let fx = fixture().await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A1"], "x@example.com"),
                holder.clone(),
            )
            .await
            .expect("hold");

        // A stranger cannot release someone else's hold.
        let err = fx
            .service
            .release(booking.id, &Holder::guest("other@example.com"))
            .await
            .expect_err("wrong holder rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::WrongState);

        fx.service
            .release(booking.id, &holder)
            .await
            .expect("release");

        assert!(fx.locks.held_seats(fx.trip_id).await.expect("held").is_empty());
        let err = fx.service.find(booking.id).await.expect_err("gone");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn extend_pushes_expiry_forward() {
        let fx = fixture().await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A1"], "x@example.com"),
                holder.clone(),
            )
            .await
            .expect("hold");
        let first_expiry = booking.hold_expires_at.expect("expiry");

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let extended = fx
            .service
            .extend(booking.id, &holder)
            .await
            .expect("extend");
        assert!(extended.hold_expires_at.expect("expiry") > first_expiry);

        // Wrong holder cannot extend.
        let err = fx
            .service
            .extend(booking.id, &Holder::guest("other@example.com"))
            .await
            .expect_err("wrong holder rejected");
        assert_eq!(err.kind, ridehub_core::error::ErrorKind::WrongState);
    }

    #[tokio::test]
    async fn cancel_confirmed_booking_frees_seats_and_quotes_refund() {
        let fx = fixture_with_departure(ChronoDuration::hours(30)).await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(hold_request(fx.trip_id, &["A1", "A2"], "x@example.com"), holder)
            .await
            .expect("hold");
        fx.service
            .confirm(booking.id, "pay-123")
            .await
            .expect("confirm");

        let cancelled = fx
            .service
            .cancel(booking.id, "plans changed", "customer")
            .await
            .expect("cancel");

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        // 30h before departure → 90% of 90_000.
        assert_eq!(cancelled.refund_amount_cents, Some(81_000));
        assert_eq!(cancelled.refund_status.as_deref(), Some("pending"));

        let trip = fx
            .trips
            .find_by_id(fx.trip_id)
            .await
            .expect("find")
            .expect("trip");
        assert!(trip.booked_seats.is_empty());
        assert_eq!(trip.available_seats, 3);
    }

    #[tokio::test]
    async fn cancel_close_to_departure_yields_no_refund() {
        let fx = fixture_with_departure(ChronoDuration::hours(3)).await;
        let holder = Holder::guest("x@example.com");

        let booking = fx
            .service
            .hold(hold_request(fx.trip_id, &["A1"], "x@example.com"), holder)
            .await
            .expect("hold");
        fx.service
            .confirm(booking.id, "pay-9")
            .await
            .expect("confirm");

        let cancelled = fx
            .service
            .cancel(booking.id, "missed connection", "customer")
            .await
            .expect("cancel");

        assert_eq!(cancelled.refund_amount_cents, Some(0));
        assert_eq!(cancelled.refund_status.as_deref(), Some("not_applicable"));
    }

    #[tokio::test]
    async fn end_to_end_scenario_two_clients_racing() {
        let fx = fixture().await;
        let x = Holder::guest("x@example.com");
        let y = Holder::guest("y@example.com");

        // Client X holds {A1, A2}.
        let bx = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A1", "A2"], "x@example.com"),
                x.clone(),
            )
            .await
            .expect("X holds A1+A2");
        assert_eq!(bx.status, BookingStatus::Pending);

        // Client Y attempts {A2, A3}: fails listing A2, A3 untouched.
        let err = fx
            .service
            .hold(
                hold_request(fx.trip_id, &["A2", "A3"], "y@example.com"),
                y.clone(),
            )
            .await
            .expect_err("Y conflicts on A2");
        let details = err.details.expect("details");
        assert_eq!(details["held_seats"], serde_json::json!(["A2"]));

        // X confirms: inventory gains A1, A2; one seat remains.
        let confirmed = fx.service.confirm(bx.id, "pay-x").await.expect("X confirms");
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        let trip = fx
            .trips
            .find_by_id(fx.trip_id)
            .await
            .expect("find")
            .expect("trip");
        assert_eq!(trip.available_seats, 1);

        // Y now holds {A3} successfully.
        fx.service
            .hold(hold_request(fx.trip_id, &["A3"], "y@example.com"), y)
            .await
            .expect("Y holds A3");
    }
}
