//! Domain layer for the traffic calculations backend.
//!
//! This crate contains:
//! - The traffic calculation model
//! - Request/response payloads and create-input validation
//! - Aggregate statistics

pub mod models;
