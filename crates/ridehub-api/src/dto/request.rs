//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ridehub_core::error::AppError;
use ridehub_core::result::AppResult;
use ridehub_entity::Passenger;

/// Run derive-based validation, mapping failures to a validation error.
pub fn validate_dto<T: Validate>(dto: &T) -> AppResult<()> {
    dto.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Passenger details for one seat.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PassengerDto {
    /// Passenger full name.
    #[validate(length(min = 1, max = 200, message = "Passenger name is required"))]
    pub full_name: String,
    /// The seat this passenger occupies.
    #[validate(length(min = 1, max = 8))]
    pub seat_label: String,
    /// Optional identity document number.
    pub document_number: Option<String>,
}

impl From<PassengerDto> for Passenger {
    fn from(dto: PassengerDto) -> Self {
        Passenger {
            full_name: dto.full_name,
            seat_label: dto.seat_label,
            document_number: dto.document_number,
        }
    }
}

/// Hold request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HoldRequestDto {
    /// The trip to book.
    pub trip_id: Uuid,
    /// Requested seat labels.
    #[validate(length(min = 1, max = 6, message = "1 to 6 seats per booking"))]
    pub seats: Vec<String>,
    /// One passenger per requested seat.
    #[validate(nested)]
    pub passengers: Vec<PassengerDto>,
    /// Contact name.
    #[validate(length(min = 1, message = "Contact name is required"))]
    pub contact_name: String,
    /// Contact email.
    #[validate(email(message = "A valid contact email is required"))]
    pub contact_email: String,
    /// Optional contact phone.
    pub contact_phone: Option<String>,
}

/// Extend request body.
///
/// Guests identify themselves with the booking's contact email; the
/// header-authenticated user id takes precedence when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendRequestDto {
    /// Guest contact email.
    pub contact_email: Option<String>,
}

/// Release query parameters (DELETE has no body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseQuery {
    /// Guest contact email.
    pub contact_email: Option<String>,
}

/// Confirm request body, sent by the payment-outcome collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmRequestDto {
    /// Payment gateway reference.
    #[validate(length(min = 1, message = "Payment reference is required"))]
    pub payment_reference: String,
}

/// Cancel request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CancelRequestDto {
    /// Cancellation reason.
    #[validate(length(min = 1, max = 500, message = "A reason is required"))]
    pub reason: String,
    /// Guest contact email (customer-initiated guest cancellations).
    pub contact_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hold_dto() -> HoldRequestDto {
        HoldRequestDto {
            trip_id: Uuid::new_v4(),
            seats: vec!["A1".to_string()],
            passengers: vec![PassengerDto {
                full_name: "Linh Tran".to_string(),
                seat_label: "A1".to_string(),
                document_number: None,
            }],
            contact_name: "Linh Tran".to_string(),
            contact_email: "linh@example.com".to_string(),
            contact_phone: None,
        }
    }

    #[test]
    fn valid_hold_request_passes() {
        assert!(validate_dto(&hold_dto()).is_ok());
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut dto = hold_dto();
        dto.contact_email = "not-an-email".to_string();
        assert!(validate_dto(&dto).is_err());
    }

    #[test]
    fn too_many_seats_are_rejected() {
        let mut dto = hold_dto();
        dto.seats = (1..=7).map(|i| format!("A{i}")).collect();
        assert!(validate_dto(&dto).is_err());
    }
}
