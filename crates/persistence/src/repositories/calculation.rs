//! Traffic calculation repository for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use domain::models::NewTrafficCalculation;

use crate::entities::{CalculationEntity, LossAverages};
use crate::metrics::{Backend, QueryTimer};
use crate::store::{CalculationStore, StoreError};

const CALCULATION_COLUMNS: &str = r#"
    id, origin, waypoint, destination,
    daily_loss_minutes, monthly_loss_hours, annual_loss_days,
    duration_in_traffic_minutes, normal_duration_minutes, distance_km,
    created_at
"#;

/// Repository for traffic calculation database operations.
#[derive(Clone)]
pub struct CalculationRepository {
    pool: PgPool,
}

impl CalculationRepository {
    /// Creates a new CalculationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalculationStore for CalculationRepository {
    async fn insert(
        &self,
        input: NewTrafficCalculation,
    ) -> Result<CalculationEntity, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "insert_calculation");
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO traffic_calculations (
                origin, waypoint, destination,
                daily_loss_minutes, monthly_loss_hours, annual_loss_days,
                duration_in_traffic_minutes, normal_duration_minutes, distance_km
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CALCULATION_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<_, CalculationEntity>(&query)
            .bind(&input.origin)
            .bind(&input.waypoint)
            .bind(&input.destination)
            .bind(input.daily_loss_minutes)
            .bind(input.monthly_loss_hours)
            .bind(input.annual_loss_days)
            .bind(input.duration_in_traffic_minutes)
            .bind(input.normal_duration_minutes)
            .bind(input.distance_km)
            .fetch_one(&mut *tx)
            .await;

        let entity = match result {
            Ok(entity) => entity,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed insert failed");
                }
                timer.finish(false);
                return Err(err.into());
            }
        };

        tx.commit().await?;
        timer.finish(true);
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CalculationEntity>, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "find_calculation_by_id");

        let query = format!("SELECT {CALCULATION_COLUMNS} FROM traffic_calculations WHERE id = $1");
        let result = sqlx::query_as::<_, CalculationEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        timer.finish(result.is_ok());
        Ok(result?)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "delete_calculation");
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM traffic_calculations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await;

        let deleted = match result {
            Ok(done) => done.rows_affected() > 0,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed delete failed");
                }
                timer.finish(false);
                return Err(err.into());
            }
        };

        tx.commit().await?;
        timer.finish(true);
        Ok(deleted)
    }

    async fn list_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CalculationEntity>, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "list_calculations");

        let query = format!(
            r#"
            SELECT {CALCULATION_COLUMNS}
            FROM traffic_calculations
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let result = sqlx::query_as::<_, CalculationEntity>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;

        timer.finish(result.is_ok());
        Ok(result?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "count_calculations");

        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM traffic_calculations")
            .fetch_one(&self.pool)
            .await;

        timer.finish(result.is_ok());
        Ok(result?)
    }

    async fn loss_averages(&self) -> Result<LossAverages, StoreError> {
        let timer = QueryTimer::new(Backend::Postgres, "calculation_loss_averages");

        let result = sqlx::query_as::<_, LossAverages>(
            r#"
            SELECT
                AVG(daily_loss_minutes) AS daily_loss_minutes,
                AVG(monthly_loss_hours) AS monthly_loss_hours,
                AVG(annual_loss_days) AS annual_loss_days
            FROM traffic_calculations
            "#,
        )
        .fetch_one(&self.pool)
        .await;

        timer.finish(result.is_ok());
        Ok(result?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
