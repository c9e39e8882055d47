//! # ridehub-worker
//!
//! The expiry sweeper: a scheduled reconciliation pass that cleans up
//! pending bookings whose hold has lapsed. The lock store's TTL already
//! frees seats for new acquisitions; the sweeper's job is to reconcile
//! the booking records (and any lingering locks) so availability never
//! shows seats taken by an abandoned hold.

pub mod scheduler;
pub mod sweeper;

pub use scheduler::SweeperScheduler;
pub use sweeper::{ExpirySweeper, SweepReport};
