//! Unified application error types for RideHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// One or more requested seats are held by another party or already booked.
    SeatUnavailable,
    /// The booking's hold has lapsed before the operation could complete.
    HoldExpired,
    /// The booking is not in a state that permits the requested transition.
    WrongState,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A seat lock store error occurred.
    LockStore,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::SeatUnavailable => write!(f, "SEAT_UNAVAILABLE"),
            Self::HoldExpired => write!(f, "HOLD_EXPIRED"),
            Self::WrongState => write!(f, "WRONG_STATE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::LockStore => write!(f, "LOCK_STORE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout RideHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. The optional `details` value carries
/// structured context — most importantly the list of conflicting seat
/// labels — so API clients can re-render a seat selection without a full
/// reload.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured machine-readable context (e.g. conflicting seats).
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a seat-unavailable error naming the conflicting seats.
    ///
    /// `held` are seats locked by another party, `booked` are seats already
    /// permanently sold. Both lists land in `details` for the client.
    pub fn seat_unavailable(held: &[String], booked: &[String]) -> Self {
        let mut all: Vec<&String> = held.iter().chain(booked.iter()).collect();
        all.sort();
        Self::new(
            ErrorKind::SeatUnavailable,
            format!(
                "Seats unavailable: {}",
                all.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
        .with_details(serde_json::json!({
            "held_seats": held,
            "booked_seats": booked,
        }))
    }

    /// Create a hold-expired error.
    pub fn hold_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HoldExpired, message)
    }

    /// Create a wrong-state error.
    pub fn wrong_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WrongState, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a lock-store error.
    pub fn lock_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockStore, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_unavailable_carries_both_causes() {
        let err = AppError::seat_unavailable(
            &["A2".to_string()],
            &["B1".to_string(), "B2".to_string()],
        );
        assert_eq!(err.kind, ErrorKind::SeatUnavailable);

        let details = err.details.expect("details present");
        assert_eq!(details["held_seats"], serde_json::json!(["A2"]));
        assert_eq!(details["booked_seats"], serde_json::json!(["B1", "B2"]));
        assert!(err.message.contains("A2"));
        assert!(err.message.contains("B1"));
    }
}
