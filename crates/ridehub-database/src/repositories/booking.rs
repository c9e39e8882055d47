//! Booking repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ridehub_core::error::{AppError, ErrorKind};
use ridehub_core::result::AppResult;
use ridehub_entity::Booking;

use crate::store::BookingStore;

/// Repository for booking CRUD and conditional state transitions.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find booking by code", e)
            })
    }

    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings ( \
                 id, code, trip_id, user_id, seats, passengers, \
                 contact_name, contact_email, contact_phone, \
                 status, hold_expires_at, \
                 base_amount_cents, discount_cents, total_amount_cents, \
                 loyalty_points, created_at, updated_at \
             ) VALUES ( \
                 $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17 \
             ) RETURNING *",
        )
        .bind(booking.id)
        .bind(&booking.code)
        .bind(booking.trip_id)
        .bind(booking.user_id)
        .bind(&booking.seats)
        .bind(&booking.passengers)
        .bind(&booking.contact_name)
        .bind(&booking.contact_email)
        .bind(&booking.contact_phone)
        .bind(booking.status)
        .bind(booking.hold_expires_at)
        .bind(booking.base_amount_cents)
        .bind(booking.discount_cents)
        .bind(booking.total_amount_cents)
        .bind(booking.loyalty_points)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create booking", e))
    }

    async fn extend_hold(
        &self,
        id: Uuid,
        new_expiry: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET hold_expires_at = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(id)
        .bind(new_expiry)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to extend hold", e))
    }

    async fn confirm(
        &self,
        id: Uuid,
        payment_reference: &str,
        loyalty_points: i32,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET status = 'confirmed', hold_expires_at = NULL, \
                 payment_reference = $2, loyalty_points = $3, \
                 confirmed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(id)
        .bind(payment_reference)
        .bind(loyalty_points)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to confirm booking", e))
    }

    async fn cancel(
        &self,
        id: Uuid,
        reason: &str,
        actor: &str,
        refund_amount_cents: i64,
        refund_status: &str,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET status = 'cancelled', hold_expires_at = NULL, \
                 cancelled_reason = $2, cancelled_by = $3, \
                 refund_amount_cents = $4, refund_status = $5, \
                 updated_at = NOW() \
             WHERE id = $1 AND status IN ('pending', 'confirmed') \
             RETURNING *",
        )
        .bind(id)
        .bind(reason)
        .bind(actor)
        .bind(refund_amount_cents)
        .bind(refund_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel booking", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete booking", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings \
             WHERE status = 'pending' AND hold_expires_at <= $1 \
             ORDER BY hold_expires_at ASC \
             LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list expired holds", e)
        })
    }
}
