//! Route definitions for the RideHub HTTP API.
//!
//! All REST routes are mounted under `/api`; the availability push
//! channel lives at `/ws`. The router receives `AppState` and passes it
//! to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(booking_routes())
        .merge(trip_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Booking lifecycle endpoints.
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/hold", post(handlers::booking::hold))
        .route("/bookings/{id}/extend", post(handlers::booking::extend))
        .route("/bookings/{id}", delete(handlers::booking::release))
        .route("/bookings/{id}/confirm", post(handlers::booking::confirm))
        .route("/bookings/{id}/cancel", post(handlers::booking::cancel))
        .route("/bookings/{id}", get(handlers::booking::get_booking))
        .route(
            "/bookings/code/{code}",
            get(handlers::booking::get_booking_by_code),
        )
}

/// Trip availability endpoints.
fn trip_routes() -> Router<AppState> {
    Router::new().route("/trips/{id}/seat-status", get(handlers::trip::seat_status))
}

/// Health endpoints.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::readiness))
}

/// CORS layer from the configured allowed origins.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_allowed_origins;
    if origins.is_empty() {
        return CorsLayer::new();
    }
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
