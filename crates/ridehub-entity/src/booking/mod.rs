//! Booking entity, refund schedule, and booking codes.

pub mod code;
pub mod model;
pub mod refund;
