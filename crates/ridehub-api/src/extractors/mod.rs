//! Axum extractors.

pub mod holder;

pub use holder::MaybeUser;
