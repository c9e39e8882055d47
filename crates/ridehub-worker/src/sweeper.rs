//! Expired-hold reconciliation.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ridehub_core::events::{AvailabilityAction, AvailabilityEvent, EventBus};
use ridehub_core::result::AppResult;
use ridehub_database::BookingStore;
use ridehub_lock::SeatLockManager;

/// Outcome of one sweep cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Bookings reconciled (deleted) this cycle.
    pub expired: usize,
    /// Bookings that could not be reconciled and will be retried.
    pub failed: usize,
}

/// Reconciles pending bookings whose hold expiry has passed.
///
/// Performs the same compensating action as an explicit release: delete
/// the booking, best-effort release any lingering locks. Each cycle is a
/// plain method call, so tests drive it deterministically without a
/// scheduler.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    /// Booking record store.
    bookings: Arc<dyn BookingStore>,
    /// Seat lock manager.
    locks: Arc<dyn SeatLockManager>,
    /// Availability event bus.
    events: EventBus,
    /// Maximum bookings reconciled per cycle.
    batch_size: i64,
}

impl ExpirySweeper {
    /// Create a new sweeper.
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        locks: Arc<dyn SeatLockManager>,
        events: EventBus,
        batch_size: i64,
    ) -> Self {
        Self {
            bookings,
            locks,
            events,
            batch_size,
        }
    }

    /// Run one sweep cycle.
    pub async fn sweep_once(&self) -> AppResult<SweepReport> {
        let now = Utc::now();
        let expired = self
            .bookings
            .find_expired_pending(now, self.batch_size)
            .await?;

        let mut report = SweepReport::default();

        for booking in expired {
            // The lock store's TTL usually beat us here; releasing is
            // best-effort and idempotent.
            if let Err(e) = self
                .locks
                .release(booking.trip_id, &booking.seats, &booking.holder().key())
                .await
            {
                warn!(
                    booking_id = %booking.id,
                    error = %e,
                    "Failed to release lingering locks for expired hold"
                );
            }

            match self.bookings.delete(booking.id).await {
                Ok(_) => {
                    report.expired += 1;
                    self.events.publish(AvailabilityEvent::now(
                        booking.trip_id,
                        Some(booking.id),
                        booking.seats.clone(),
                        AvailabilityAction::Expired,
                    ));
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        booking_id = %booking.id,
                        error = %e,
                        "Failed to delete expired booking; will retry next sweep"
                    );
                }
            }
        }

        if report.expired > 0 || report.failed > 0 {
            info!(
                expired = report.expired,
                failed = report.failed,
                "Expiry sweep completed"
            );
        }

        Ok(report)
    }
}
