//! Trip repository — the inventory update protocol.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use ridehub_core::error::{AppError, ErrorKind};
use ridehub_core::result::AppResult;
use ridehub_entity::Trip;

use crate::store::TripStore;

/// Repository for trip inventory reads and atomic seat-set updates.
#[derive(Debug, Clone)]
pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    /// Create a new trip repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for TripRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find trip", e))
    }

    async fn commit_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>> {
        // The `NOT (booked_seats && $2)` overlap guard makes this append
        // the final arbiter under concurrent confirmations: exactly one of
        // two racing updates for an overlapping seat set matches the row.
        let trip = sqlx::query_as::<_, Trip>(
            "UPDATE trips \
             SET booked_seats = booked_seats || $2, \
                 available_seats = total_seats - (cardinality(booked_seats) + cardinality($2)), \
                 updated_at = NOW() \
             WHERE id = $1 \
               AND status = 'scheduled' \
               AND NOT (booked_seats && $2) \
               AND $2 <@ seat_labels \
             RETURNING *",
        )
        .bind(trip_id)
        .bind(seats)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit seats", e))?;

        debug!(
            trip_id = %trip_id,
            seats = ?seats,
            committed = trip.is_some(),
            "Inventory commit attempt"
        );
        Ok(trip)
    }

    async fn release_seats(&self, trip_id: Uuid, seats: &[String]) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(
            "UPDATE trips \
             SET booked_seats = \
                     (SELECT COALESCE(array_agg(s), '{}') \
                      FROM unnest(booked_seats) AS s \
                      WHERE s <> ALL($2)), \
                 available_seats = total_seats - \
                     (SELECT COUNT(*) \
                      FROM unnest(booked_seats) AS s \
                      WHERE s <> ALL($2))::int, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(trip_id)
        .bind(seats)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release seats", e))?;

        debug!(trip_id = %trip_id, seats = ?seats, "Inventory release");
        Ok(trip)
    }
}
