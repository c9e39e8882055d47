//! In-memory seat lock manager using a Tokio mutex for single-node
//! deployments.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use ridehub_core::result::AppResult;
use ridehub_entity::HeldSeat;

use crate::manager::{LockOutcome, SeatLockManager};

/// One live lock entry.
#[derive(Debug, Clone)]
struct LockEntry {
    /// The owning holder key.
    holder: String,
    /// When the lock lapses.
    expires_at: DateTime<Utc>,
}

impl LockEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-memory seat lock manager.
///
/// A single mutex around the lock table gives the same all-or-nothing
/// semantics the Redis Lua scripts provide. Suitable for single-node
/// deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemorySeatLockManager {
    /// (trip, seat) → lock entry. Expired entries are purged lazily.
    locks: Arc<Mutex<HashMap<(Uuid, String), LockEntry>>>,
}

impl MemorySeatLockManager {
    /// Create a new memory-based seat lock manager.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatLockManager for MemorySeatLockManager {
    async fn acquire(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl.as_secs() as i64);
        let mut locks = self.locks.lock().await;

        let conflicting: Vec<String> = seats
            .iter()
            .filter(|seat| {
                locks
                    .get(&(trip_id, (*seat).clone()))
                    .map(|entry| entry.is_live(now) && entry.holder != holder_key)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            debug!(
                trip_id = %trip_id,
                conflicting = ?conflicting,
                "Seat lock acquisition denied"
            );
            return Ok(LockOutcome::Conflict {
                seats: conflicting,
            });
        }

        for seat in seats {
            locks.insert(
                (trip_id, seat.clone()),
                LockEntry {
                    holder: holder_key.to_string(),
                    expires_at,
                },
            );
        }

        info!(
            trip_id = %trip_id,
            seats = ?seats,
            holder = %holder_key,
            "Seat locks acquired"
        );
        Ok(LockOutcome::Acquired { expires_at })
    }

    async fn extend(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl.as_secs() as i64);
        let mut locks = self.locks.lock().await;

        let conflicting: Vec<String> = seats
            .iter()
            .filter(|seat| {
                locks
                    .get(&(trip_id, (*seat).clone()))
                    .map(|entry| !entry.is_live(now) || entry.holder != holder_key)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            return Ok(LockOutcome::Conflict {
                seats: conflicting,
            });
        }

        for seat in seats {
            if let Some(entry) = locks.get_mut(&(trip_id, seat.clone())) {
                entry.expires_at = expires_at;
            }
        }

        Ok(LockOutcome::Acquired { expires_at })
    }

    async fn release(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64> {
        let mut locks = self.locks.lock().await;
        let mut removed = 0u64;

        for seat in seats {
            let key = (trip_id, seat.clone());
            if locks
                .get(&key)
                .map(|entry| entry.holder == holder_key)
                .unwrap_or(false)
            {
                locks.remove(&key);
                removed += 1;
            }
        }

        debug!(trip_id = %trip_id, removed = removed, "Seat locks released");
        Ok(removed)
    }

    async fn promote(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64> {
        self.release(trip_id, seats, holder_key).await
    }

    async fn held_seats(&self, trip_id: Uuid) -> AppResult<Vec<HeldSeat>> {
        let now = Utc::now();
        let mut locks = self.locks.lock().await;

        locks.retain(|_, entry| entry.is_live(now));

        Ok(locks
            .iter()
            .filter(|((trip, _), _)| *trip == trip_id)
            .map(|((_, seat), entry)| HeldSeat {
                seat: seat.clone(),
                holder_key: entry.holder.clone(),
            })
            .collect())
    }
}
