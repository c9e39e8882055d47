//! In-memory store fakes for service-level tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use ridehub_core::error::AppError;
use ridehub_core::result::AppResult;
use ridehub_database::{BookingStore, TripStore};
use ridehub_entity::{Booking, Trip, TripStatus};

/// Build a scheduled trip with the given seat layout.
pub fn scheduled_trip(labels: &[&str], departs_in: Duration) -> Trip {
    let now = Utc::now();
    let seat_labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
    Trip {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        route_origin: "Hanoi".to_string(),
        route_destination: "Da Nang".to_string(),
        departure_at: now + departs_in,
        status: TripStatus::Scheduled,
        total_seats: seat_labels.len() as i32,
        available_seats: seat_labels.len() as i32,
        seat_labels,
        booked_seats: vec![],
        seat_price_cents: 45_000,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory trip store mirroring the conditional-update protocol.
#[derive(Debug, Default)]
pub struct InMemoryTripStore {
    trips: Mutex<HashMap<Uuid, Trip>>,
}

impl InMemoryTripStore {
    /// Create a store seeded with one trip.
    pub fn with_trip(trip: Trip) -> Self {
        let store = Self::default();
        store
            .trips
            .lock()
            .expect("lock poisoned")
            .insert(trip.id, trip);
        store
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self.trips.lock().expect("lock poisoned").get(&id).cloned())
    }

    async fn commit_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>> {
        let mut trips = self.trips.lock().expect("lock poisoned");
        let Some(trip) = trips.get_mut(&trip_id) else {
            return Ok(None);
        };

        let condition_holds = trip.status == TripStatus::Scheduled
            && seats.iter().all(|s| trip.seat_labels.contains(s))
            && !seats.iter().any(|s| trip.booked_seats.contains(s));
        if !condition_holds {
            return Ok(None);
        }

        trip.booked_seats.extend(seats.iter().cloned());
        trip.available_seats = trip.total_seats - trip.booked_seats.len() as i32;
        trip.updated_at = Utc::now();
        Ok(Some(trip.clone()))
    }

    async fn release_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>> {
        let mut trips = self.trips.lock().expect("lock poisoned");
        let Some(trip) = trips.get_mut(&trip_id) else {
            return Ok(None);
        };

        trip.booked_seats.retain(|s| !seats.contains(s));
        trip.available_seats = trip.total_seats - trip.booked_seats.len() as i32;
        trip.updated_at = Utc::now();
        Ok(Some(trip.clone()))
    }
}

/// In-memory booking store mirroring the conditional-transition protocol.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    rows: Mutex<HashMap<Uuid, Booking>>,
    fail_creates: AtomicUsize,
}

impl InMemoryBookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` create calls fail.
    pub fn fail_next_creates(&self, n: usize) {
        self.fail_creates.store(n, Ordering::SeqCst);
    }

    /// Overwrite a booking's hold expiry (to simulate lapse).
    pub async fn force_hold_expiry(&self, id: Uuid, when: DateTime<Utc>) {
        if let Some(row) = self.rows.lock().expect("lock poisoned").get_mut(&id) {
            row.hold_expires_at = Some(when);
        }
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.rows.lock().expect("lock poisoned").get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Booking>> {
        Ok(self
            .rows
            .lock()
            .expect("lock poisoned")
            .values()
            .find(|b| b.code == code)
            .cloned())
    }

    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        let remaining = self.fail_creates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_creates.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::database("simulated insert failure"));
        }

        let mut rows = self.rows.lock().expect("lock poisoned");
        if rows.values().any(|b| b.code == booking.code) {
            return Err(AppError::database("duplicate booking code"));
        }
        rows.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn extend_hold(
        &self,
        id: Uuid,
        new_expiry: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        let mut rows = self.rows.lock().expect("lock poisoned");
        match rows.get_mut(&id) {
            Some(row) if row.is_pending() => {
                row.hold_expires_at = Some(new_expiry);
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn confirm(
        &self,
        id: Uuid,
        payment_reference: &str,
        loyalty_points: i32,
    ) -> AppResult<Option<Booking>> {
        let mut rows = self.rows.lock().expect("lock poisoned");
        match rows.get_mut(&id) {
            Some(row) if row.is_pending() => {
                row.status = ridehub_entity::BookingStatus::Confirmed;
                row.hold_expires_at = None;
                row.payment_reference = Some(payment_reference.to_string());
                row.loyalty_points = loyalty_points;
                row.confirmed_at = Some(Utc::now());
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn cancel(
        &self,
        id: Uuid,
        reason: &str,
        actor: &str,
        refund_amount_cents: i64,
        refund_status: &str,
    ) -> AppResult<Option<Booking>> {
        let mut rows = self.rows.lock().expect("lock poisoned");
        match rows.get_mut(&id) {
            Some(row)
                if matches!(
                    row.status,
                    ridehub_entity::BookingStatus::Pending
                        | ridehub_entity::BookingStatus::Confirmed
                ) =>
            {
                row.status = ridehub_entity::BookingStatus::Cancelled;
                row.hold_expires_at = None;
                row.cancelled_reason = Some(reason.to_string());
                row.cancelled_by = Some(actor.to_string());
                row.refund_amount_cents = Some(refund_amount_cents);
                row.refund_status = Some(refund_status.to_string());
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self
            .rows
            .lock()
            .expect("lock poisoned")
            .remove(&id)
            .is_some())
    }

    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let rows = self.rows.lock().expect("lock poisoned");
        let mut expired: Vec<Booking> = rows
            .values()
            .filter(|b| b.is_pending() && b.hold_expires_at.map(|e| e <= now).unwrap_or(false))
            .cloned()
            .collect();
        expired.sort_by_key(|b| b.hold_expires_at);
        expired.truncate(limit as usize);
        Ok(expired)
    }
}
