//! # ridehub-lock
//!
//! The seat lock manager: short-lived, per-seat mutual exclusion on top of
//! a TTL key-value store. Every multi-seat operation is all-or-nothing.
//!
//! Two implementations exist behind the [`SeatLockManager`] trait: a
//! Redis-backed one (Lua scripts make the multi-key check-and-write atomic
//! inside the store) for multi-node deployments, and an in-memory one for
//! single-node use and tests.

pub mod manager;
pub mod memory;
#[cfg(feature = "redis-lock")]
pub mod redis;

pub use manager::{LockOutcome, SeatLockManager};
pub use memory::MemorySeatLockManager;
#[cfg(feature = "redis-lock")]
pub use redis::RedisSeatLockManager;
