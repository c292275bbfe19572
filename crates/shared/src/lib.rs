//! Shared utilities and common types for the traffic calculations backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Page-number pagination math
//! - Numeric rounding helpers

pub mod pagination;
pub mod rounding;
