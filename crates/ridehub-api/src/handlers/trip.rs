//! Trip availability endpoints.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ridehub_entity::SeatMap;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/trips/{id}/seat-status — per-seat availability.
pub async fn seat_status(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<SeatMap>, ApiError> {
    let map = state.trip_service.seat_status(trip_id).await?;
    Ok(Json(map))
}
