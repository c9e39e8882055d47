//! # ridehub-service
//!
//! Domain services: the booking lifecycle state machine (hold → confirm /
//! release / expire / cancel) and trip seat-status queries. Services own
//! the coordination between the seat lock store and the trip inventory;
//! they never decide seat ownership by separate read-then-write steps.

pub mod booking;
pub mod trip;

#[cfg(test)]
pub(crate) mod testing;

pub use booking::service::{BookingService, HoldRequest};
pub use trip::service::TripService;
