//! Seat lock manager trait and shared types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ridehub_core::result::AppResult;
use ridehub_entity::HeldSeat;

/// Result of an acquire or extend attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockOutcome {
    /// Every seat in the set transitioned together.
    Acquired {
        /// When the locks will lapse unless extended or promoted.
        expires_at: DateTime<Utc>,
    },
    /// No seat transitioned; these seats are held by someone else (for
    /// extend: not held by the caller).
    Conflict {
        /// The conflicting seat labels.
        seats: Vec<String>,
    },
}

/// Short-lived per-seat mutual exclusion.
///
/// Implementations must make every multi-seat operation atomic per seat
/// set: either all seats in the set transition together or none do. The
/// lock store is the single source of truth for deciding seat ownership
/// between racing holds — callers never decide by reading and then
/// writing in separate steps.
#[async_trait]
pub trait SeatLockManager: Send + Sync + std::fmt::Debug {
    /// Atomically create a lock for every seat in `seats`.
    ///
    /// Fails with `Conflict` (and leaves nothing behind) if any seat is
    /// locked by a different holder. Seats already held by `holder_key`
    /// are refreshed rather than rejected.
    async fn acquire(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome>;

    /// Refresh the expiry of every seat in `seats`.
    ///
    /// Fails with `Conflict` (extending nothing) unless every seat is
    /// currently held by `holder_key`.
    async fn extend(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome>;

    /// Delete the locks owned by `holder_key`.
    ///
    /// Idempotent: releasing an already-released or expired lock is not an
    /// error. Returns the number of locks actually removed.
    async fn release(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64>;

    /// Delete the locks as part of a successful confirmation.
    ///
    /// Called only by the booking lifecycle inside the confirm transition,
    /// after the seats are durably recorded in the trip inventory.
    async fn promote(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64>;

    /// List the live locks for a trip.
    async fn held_seats(&self, trip_id: Uuid) -> AppResult<Vec<HeldSeat>>;
}
