//! sqlx-backed repository implementations.

pub mod booking;
pub mod trip;

pub use booking::BookingRepository;
pub use trip::TripRepository;
