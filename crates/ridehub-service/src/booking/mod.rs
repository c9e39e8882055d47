//! Booking lifecycle management.

pub mod service;
