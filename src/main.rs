//! RideHub Server — Seat Reservation & Booking Platform
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use ridehub_core::config::AppConfig;
use ridehub_core::error::AppError;
use ridehub_core::events::EventBus;
use ridehub_core::traits::cache::CacheProvider;
use ridehub_database::{BookingStore, TripStore};
use ridehub_lock::SeatLockManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("RIDEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RideHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = ridehub_database::connection::DatabasePool::connect(&config.database).await?;
    ridehub_database::migration::run_migrations(db.pool()).await?;
    let db_pool = db.into_pool();

    // ── Step 2: Cache + seat lock store ──────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = Arc::new(ridehub_cache::provider::CacheManager::new(&config.cache).await?);

    let locks: Arc<dyn SeatLockManager> = match config.cache.provider.as_str() {
        "redis" => {
            let client = ridehub_cache::redis::RedisClient::connect(&config.cache).await?;
            Arc::new(ridehub_lock::RedisSeatLockManager::new(client))
        }
        "memory" => Arc::new(ridehub_lock::MemorySeatLockManager::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown lock store provider: '{other}'. Supported: memory, redis"
            )));
        }
    };
    tracing::info!("Seat lock store initialized");

    // ── Step 3: Repositories ─────────────────────────────────────
    let trip_repo: Arc<dyn TripStore> = Arc::new(
        ridehub_database::repositories::trip::TripRepository::new(db_pool.clone()),
    );
    let booking_repo: Arc<dyn BookingStore> = Arc::new(
        ridehub_database::repositories::booking::BookingRepository::new(db_pool.clone()),
    );

    // ── Step 4: Event bus + services ─────────────────────────────
    let events = EventBus::default();

    let booking_service = Arc::new(ridehub_service::BookingService::new(
        Arc::clone(&trip_repo),
        Arc::clone(&booking_repo),
        Arc::clone(&locks),
        events.clone(),
        config.booking.clone(),
    ));

    let cache_provider: Arc<dyn CacheProvider> = cache.clone();
    let trip_service = Arc::new(ridehub_service::TripService::new(
        Arc::clone(&trip_repo),
        Arc::clone(&locks),
        cache_provider,
        &config.cache,
    ));
    tracing::info!("Services initialized");

    // ── Step 5: Availability broadcaster ─────────────────────────
    let broadcaster = Arc::new(ridehub_realtime::AvailabilityBroadcaster::new(
        Arc::clone(&trip_service),
        config.realtime.clone(),
    ));
    let broadcaster_task = Arc::clone(&broadcaster).attach(&events);
    tracing::info!("Availability broadcaster attached");

    // ── Step 6: Expiry sweeper ───────────────────────────────────
    let mut sweeper_scheduler = if config.worker.enabled {
        let sweeper = Arc::new(ridehub_worker::ExpirySweeper::new(
            Arc::clone(&booking_repo),
            Arc::clone(&locks),
            events.clone(),
            config.worker.sweep_batch_size,
        ));

        let scheduler = ridehub_worker::SweeperScheduler::new(sweeper).await?;
        scheduler.register_sweep(&config.worker).await?;
        scheduler.start().await?;

        tracing::info!("Expiry sweeper started");
        Some(scheduler)
    } else {
        tracing::info!("Expiry sweeper disabled");
        None
    };

    // ── Step 7: HTTP server ──────────────────────────────────────
    let app_state = ridehub_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        cache: Arc::clone(&cache),
        booking_service,
        trip_service,
        broadcaster,
    };

    let app = ridehub_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("RideHub server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 8: Stop background tasks ────────────────────────────
    if let Some(scheduler) = sweeper_scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    broadcaster_task.abort();

    tracing::info!("RideHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
