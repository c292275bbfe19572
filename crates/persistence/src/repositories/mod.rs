//! Repository implementations for database operations.

pub mod calculation;
pub mod memory;

pub use calculation::CalculationRepository;
pub use memory::InMemoryCalculationStore;
