//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod calculation;

pub use calculation::{CalculationEntity, LossAverages};
