//! Storage contract for traffic calculations.
//!
//! Handlers only talk to `CalculationStore`; the PostgreSQL repository backs
//! production and the in-memory store backs tests and local runs.

use async_trait::async_trait;
use thiserror::Error;

use domain::models::NewTrafficCalculation;

use crate::entities::{CalculationEntity, LossAverages};

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Storage operations over the traffic_calculations table.
#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Insert one calculation atomically and return the stored row.
    async fn insert(&self, input: NewTrafficCalculation)
        -> Result<CalculationEntity, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<CalculationEntity>, StoreError>;

    /// Hard-delete a calculation. Returns false when no row had that id.
    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// One page of calculations, newest first (ties broken by id, newest first).
    async fn list_page(&self, limit: i64, offset: i64)
        -> Result<Vec<CalculationEntity>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Averages of the daily, monthly and annual loss columns.
    async fn loss_averages(&self) -> Result<LossAverages, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
