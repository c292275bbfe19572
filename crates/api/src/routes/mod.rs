//! HTTP route handlers.

pub mod calculations;
pub mod health;
