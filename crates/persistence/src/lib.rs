//! Persistence layer for the traffic calculations backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - The `CalculationStore` contract with PostgreSQL and in-memory implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::{CalculationStore, StoreError};
