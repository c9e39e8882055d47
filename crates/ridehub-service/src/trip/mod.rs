//! Trip availability queries.

pub mod service;
