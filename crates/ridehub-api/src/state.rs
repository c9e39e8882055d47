//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use ridehub_cache::provider::CacheManager;
use ridehub_core::config::AppConfig;
use ridehub_realtime::AvailabilityBroadcaster;
use ridehub_service::{BookingService, TripService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (readiness checks).
    pub db_pool: PgPool,
    /// Cache manager (readiness checks).
    pub cache: Arc<CacheManager>,
    /// Booking lifecycle manager.
    pub booking_service: Arc<BookingService>,
    /// Trip availability queries.
    pub trip_service: Arc<TripService>,
    /// Seat-map push fan-out.
    pub broadcaster: Arc<AvailabilityBroadcaster>,
}
