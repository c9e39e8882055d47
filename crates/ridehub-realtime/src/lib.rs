//! # ridehub-realtime
//!
//! The availability broadcaster: WebSocket connections subscribe per trip
//! and receive a fresh seat map whenever that trip's availability changes.
//! Delivery is best-effort and never blocks the transition that triggered
//! it; racing publishes for one trip are serialized so the latest state
//! wins.

pub mod broadcaster;
pub mod channel;
pub mod connection;
pub mod message;

pub use broadcaster::AvailabilityBroadcaster;
pub use connection::handle::{ConnectionHandle, ConnectionId};
