//! # ridehub-core
//!
//! Core crate for RideHub. Contains configuration schemas, the unified
//! error system, holder identity, availability events, and trait seams
//! shared by every other crate.
//!
//! This crate has **no** internal dependencies on other RideHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
