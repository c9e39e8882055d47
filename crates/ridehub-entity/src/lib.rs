//! # ridehub-entity
//!
//! Domain entity models for RideHub: trips with their authoritative seat
//! inventory, bookings with the hold/confirm/cancel lifecycle, and the
//! derived seat-map view pushed to clients.

pub mod booking;
pub mod trip;

pub use booking::model::{Booking, BookingStatus, Passenger};
pub use trip::model::{Trip, TripStatus};
pub use trip::seat_map::{HeldSeat, SeatMap, SeatState};

/// Re-exported JSONB wrapper used by entity fields (`Booking::passengers`).
pub use sqlx::types::Json;
