//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use ridehub_core::error::{AppError, ErrorKind};

/// Newtype making the domain error an Axum response.
///
/// Handlers return `Result<_, ApiError>`; the `From` impl lets `?`
/// propagate `AppError` from the service layer directly.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Standard API error response body.
///
/// `details` carries structured context such as the conflicting seat
/// labels, so clients can re-render a seat selection without a reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::SeatUnavailable | ErrorKind::Conflict | ErrorKind::WrongState => {
                StatusCode::CONFLICT
            }
            ErrorKind::HoldExpired => StatusCode::GONE,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Database
            | ErrorKind::Cache
            | ErrorKind::LockStore
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %err.message, kind = %err.kind, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
            details: err.details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_conflicts_map_to_http_409() {
        let err = ApiError(AppError::seat_unavailable(&["A2".to_string()], &[]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn expired_hold_maps_to_http_410() {
        let err = ApiError(AppError::hold_expired("lapsed"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn validation_maps_to_http_400() {
        let err = ApiError(AppError::validation("bad input"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
