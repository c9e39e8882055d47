//! Booking lifecycle endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use ridehub_service::HoldRequest;

use crate::dto::request::{
    CancelRequestDto, ConfirmRequestDto, ExtendRequestDto, HoldRequestDto, ReleaseQuery,
    validate_dto,
};
use crate::dto::response::BookingResponse;
use crate::error::ApiError;
use crate::extractors::MaybeUser;
use crate::state::AppState;

/// POST /api/bookings/hold — place a time-bounded hold on seats.
pub async fn hold(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<HoldRequestDto>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    validate_dto(&body)?;

    let holder = user.resolve(Some(&body.contact_email))?;
    let request = HoldRequest {
        trip_id: body.trip_id,
        seats: body.seats,
        passengers: body.passengers.into_iter().map(Into::into).collect(),
        contact_name: body.contact_name,
        contact_email: body.contact_email,
        contact_phone: body.contact_phone,
    };

    let booking = state.booking_service.hold(request, holder).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// POST /api/bookings/{id}/extend — push the hold expiry forward.
pub async fn extend(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    user: MaybeUser,
    Json(body): Json<ExtendRequestDto>,
) -> Result<Json<BookingResponse>, ApiError> {
    let holder = user.resolve(body.contact_email.as_deref())?;
    let booking = state.booking_service.extend(booking_id, &holder).await?;
    Ok(Json(booking.into()))
}

/// DELETE /api/bookings/{id} — release a pending hold.
pub async fn release(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    user: MaybeUser,
    Query(query): Query<ReleaseQuery>,
) -> Result<StatusCode, ApiError> {
    let holder = user.resolve(query.contact_email.as_deref())?;
    state.booking_service.release(booking_id, &holder).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/bookings/{id}/confirm — promote a hold after payment success.
///
/// Called by the payment-outcome collaborator, which has already verified
/// gateway authenticity. Duplicate callbacks are tolerated.
pub async fn confirm(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<ConfirmRequestDto>,
) -> Result<Json<BookingResponse>, ApiError> {
    validate_dto(&body)?;
    let booking = state
        .booking_service
        .confirm(booking_id, &body.payment_reference)
        .await?;
    Ok(Json(booking.into()))
}

/// POST /api/bookings/{id}/cancel — cancel a pending or confirmed booking.
pub async fn cancel(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    user: MaybeUser,
    Json(body): Json<CancelRequestDto>,
) -> Result<Json<BookingResponse>, ApiError> {
    validate_dto(&body)?;

    // Actor attribution: a caller presenting the booking's own identity is
    // the customer; anything else is an operator-facing collaborator.
    let booking = state.booking_service.find(booking_id).await?;
    let actor = match user.resolve(body.contact_email.as_deref()) {
        Ok(holder) if holder.key() == booking.holder().key() => "customer",
        _ => "operator",
    };

    let cancelled = state
        .booking_service
        .cancel(booking_id, &body.reason, actor)
        .await?;
    Ok(Json(cancelled.into()))
}

/// GET /api/bookings/{id} — fetch a booking.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.booking_service.find(booking_id).await?;
    Ok(Json(booking.into()))
}

/// GET /api/bookings/code/{code} — guest lookup by booking code.
pub async fn get_booking_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.booking_service.find_by_code(&code).await?;
    Ok(Json(booking.into()))
}
