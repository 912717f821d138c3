//! Batch email verification service
//!
//! Accepts a CSV of addresses, verifies each one with bounded concurrency in
//! the background, and exposes progress and per-address results for polling.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
