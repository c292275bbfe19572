//! Domain models for traffic calculations.

pub mod traffic_calculation;

pub use traffic_calculation::{
    CalculationResponse, CalculationStats, CalculationValidationError, CreateCalculationRequest,
    ListCalculationsResponse, NewTrafficCalculation, TrafficCalculation, REQUIRED_FIELDS,
};
