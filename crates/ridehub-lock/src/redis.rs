//! Redis-based seat lock manager using Lua scripts for atomicity.
//!
//! Suitable for multi-node deployments. One key per (trip, seat); the
//! value is the holder key and the TTL is the hold duration, so abandoned
//! locks free themselves without any cleanup action by the holder.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ridehub_cache::redis::RedisClient;
use ridehub_core::error::{AppError, ErrorKind};
use ridehub_core::result::AppResult;
use ridehub_entity::HeldSeat;

use crate::manager::{LockOutcome, SeatLockManager};

/// Lua script for atomic all-or-nothing multi-seat acquisition.
///
/// KEYS    = one key per requested seat
/// ARGV[1] = holder key
/// ARGV[2] = TTL in seconds
///
/// Returns the 1-based indices of conflicting keys; an empty array means
/// every seat was locked (seats already held by the same holder are
/// refreshed).
const ACQUIRE_SCRIPT: &str = r#"
    local holder = ARGV[1]
    local ttl = tonumber(ARGV[2])

    local conflicts = {}
    for i, key in ipairs(KEYS) do
        local current = redis.call('GET', key)
        if current and current ~= holder then
            table.insert(conflicts, i)
        end
    end
    if #conflicts > 0 then
        return conflicts
    end

    for i, key in ipairs(KEYS) do
        redis.call('SET', key, holder, 'EX', ttl)
    end
    return {}
"#;

/// Lua script for atomic all-or-nothing extension.
///
/// Same arguments as the acquire script. A seat that is missing or held
/// by a different holder fails the whole call.
const EXTEND_SCRIPT: &str = r#"
    local holder = ARGV[1]
    local ttl = tonumber(ARGV[2])

    local conflicts = {}
    for i, key in ipairs(KEYS) do
        local current = redis.call('GET', key)
        if not current or current ~= holder then
            table.insert(conflicts, i)
        end
    end
    if #conflicts > 0 then
        return conflicts
    end

    for i, key in ipairs(KEYS) do
        redis.call('EXPIRE', key, ttl)
    end
    return {}
"#;

/// Lua script for owner-checked deletion (release and promote).
///
/// Deletes only the keys whose value matches the holder; returns how many
/// were removed.
const RELEASE_SCRIPT: &str = r#"
    local holder = ARGV[1]
    local removed = 0
    for i, key in ipairs(KEYS) do
        if redis.call('GET', key) == holder then
            removed = removed + redis.call('DEL', key)
        end
    end
    return removed
"#;

/// Redis-backed seat lock manager for multi-node deployments.
#[derive(Debug, Clone)]
pub struct RedisSeatLockManager {
    /// Shared Redis client.
    client: RedisClient,
}

impl RedisSeatLockManager {
    /// Create a new Redis seat lock manager.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Full key for one seat of one trip.
    fn seat_key(&self, trip_id: Uuid, seat: &str) -> String {
        self.client.prefixed_key(&format!("seat:{trip_id}:{seat}"))
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::LockStore, format!("Lock store error: {e}"), e)
    }

    /// Run an all-or-nothing script, translating conflict indices back to
    /// seat labels.
    async fn run_guarded(
        &self,
        script: &str,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome> {
        let expires_at = Utc::now()
            + chrono::Duration::seconds(ttl.as_secs() as i64);

        let redis_script = redis::Script::new(script);
        let mut invocation = redis_script.prepare_invoke();
        for seat in seats {
            invocation.key(self.seat_key(trip_id, seat));
        }
        invocation.arg(holder_key).arg(ttl.as_secs());

        let mut conn = self.client.conn_mut();
        let conflict_indices: Vec<i64> = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if conflict_indices.is_empty() {
            return Ok(LockOutcome::Acquired { expires_at });
        }

        let conflicting: Vec<String> = conflict_indices
            .iter()
            .filter_map(|i| seats.get((*i - 1) as usize).cloned())
            .collect();

        Ok(LockOutcome::Conflict {
            seats: conflicting,
        })
    }
}

#[async_trait]
impl SeatLockManager for RedisSeatLockManager {
    async fn acquire(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome> {
        let outcome = self
            .run_guarded(ACQUIRE_SCRIPT, trip_id, seats, holder_key, ttl)
            .await?;

        match &outcome {
            LockOutcome::Acquired { expires_at } => {
                info!(
                    trip_id = %trip_id,
                    seats = ?seats,
                    holder = %holder_key,
                    expires_at = %expires_at,
                    "Seat locks acquired"
                );
            }
            LockOutcome::Conflict { seats: conflicting } => {
                debug!(
                    trip_id = %trip_id,
                    conflicting = ?conflicting,
                    "Seat lock acquisition denied"
                );
            }
        }
        Ok(outcome)
    }

    async fn extend(
        &self,
        trip_id: Uuid,
        seats: &[String],
        holder_key: &str,
        ttl: Duration,
    ) -> AppResult<LockOutcome> {
        let outcome = self
            .run_guarded(EXTEND_SCRIPT, trip_id, seats, holder_key, ttl)
            .await?;

        if let LockOutcome::Conflict { seats: conflicting } = &outcome {
            warn!(
                trip_id = %trip_id,
                conflicting = ?conflicting,
                holder = %holder_key,
                "Seat lock extension denied"
            );
        }
        Ok(outcome)
    }

    async fn release(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64> {
        let redis_script = redis::Script::new(RELEASE_SCRIPT);
        let mut invocation = redis_script.prepare_invoke();
        for seat in seats {
            invocation.key(self.seat_key(trip_id, seat));
        }
        invocation.arg(holder_key);

        let mut conn = self.client.conn_mut();
        let removed: u64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(
            trip_id = %trip_id,
            seats = ?seats,
            removed = removed,
            "Seat locks released"
        );
        Ok(removed)
    }

    async fn promote(&self, trip_id: Uuid, seats: &[String], holder_key: &str) -> AppResult<u64> {
        // Promotion is deletion with the same ownership guard; permanence
        // now lives in the trip inventory.
        let removed = self.release(trip_id, seats, holder_key).await?;
        debug!(
            trip_id = %trip_id,
            seats = ?seats,
            removed = removed,
            "Seat locks promoted"
        );
        Ok(removed)
    }

    async fn held_seats(&self, trip_id: Uuid) -> AppResult<Vec<HeldSeat>> {
        let pattern = self.client.prefixed_key(&format!("seat:{trip_id}:*"));
        let mut conn = self.client.conn_mut();

        let mut held = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;

            for key in keys {
                // Key layout: {prefix}:seat:{trip_id}:{label}
                let Some(label) = key.rsplit(':').next() else {
                    continue;
                };
                let holder: Option<String> = conn.get(&key).await.map_err(Self::map_err)?;
                if let Some(holder_key) = holder {
                    held.push(HeldSeat {
                        seat: label.to_string(),
                        holder_key,
                    });
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(held)
    }
}
