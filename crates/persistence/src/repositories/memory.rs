//! In-memory traffic calculation store.
//!
//! Mirrors the table constraints of the PostgreSQL schema so handlers behave
//! the same against either backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use domain::models::NewTrafficCalculation;

use crate::entities::{CalculationEntity, LossAverages};
use crate::metrics::{Backend, QueryTimer};
use crate::store::{CalculationStore, StoreError};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<i64, CalculationEntity>,
    last_id: i64,
}

/// Calculation store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCalculationStore {
    table: RwLock<MemoryTable>,
}

impl InMemoryCalculationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_constraints(input: &NewTrafficCalculation) -> Result<(), StoreError> {
    if input.origin.is_empty() {
        return Err(StoreError::Constraint("origin must not be empty".to_string()));
    }
    if input.destination.is_empty() {
        return Err(StoreError::Constraint(
            "destination must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Divides before summing so large finite inputs cannot overflow.
fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    let count = count as f64;
    Some(values.map(|v| v / count).sum())
}

#[async_trait]
impl CalculationStore for InMemoryCalculationStore {
    async fn insert(
        &self,
        input: NewTrafficCalculation,
    ) -> Result<CalculationEntity, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "insert_calculation");

        if let Err(err) = check_constraints(&input) {
            timer.finish(false);
            return Err(err);
        }

        let mut table = self.table.write().await;
        table.last_id += 1;

        let entity = CalculationEntity {
            id: table.last_id,
            origin: input.origin,
            waypoint: input.waypoint,
            destination: input.destination,
            daily_loss_minutes: input.daily_loss_minutes,
            monthly_loss_hours: input.monthly_loss_hours,
            annual_loss_days: input.annual_loss_days,
            duration_in_traffic_minutes: input.duration_in_traffic_minutes,
            normal_duration_minutes: input.normal_duration_minutes,
            distance_km: input.distance_km,
            created_at: Utc::now(),
        };
        table.rows.insert(entity.id, entity.clone());

        timer.finish(true);
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CalculationEntity>, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "find_calculation_by_id");
        let found = self.table.read().await.rows.get(&id).cloned();
        timer.finish(true);
        Ok(found)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "delete_calculation");
        let removed = self.table.write().await.rows.remove(&id).is_some();
        timer.finish(true);
        Ok(removed)
    }

    async fn list_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CalculationEntity>, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "list_calculations");

        let table = self.table.read().await;
        let mut rows: Vec<&CalculationEntity> = table.rows.values().collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let page = rows.into_iter().skip(skip).take(take).cloned().collect();

        timer.finish(true);
        Ok(page)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "count_calculations");
        let count = self.table.read().await.rows.len();
        timer.finish(true);
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn loss_averages(&self) -> Result<LossAverages, StoreError> {
        let timer = QueryTimer::new(Backend::Memory, "calculation_loss_averages");

        let table = self.table.read().await;
        let rows = || table.rows.values();
        let averages = LossAverages {
            daily_loss_minutes: mean(rows().map(|r| r.daily_loss_minutes)),
            monthly_loss_hours: mean(rows().map(|r| r.monthly_loss_hours)),
            annual_loss_days: mean(rows().map(|r| r.annual_loss_days)),
        };

        timer.finish(true);
        Ok(averages)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_calculation(origin: &str, daily_loss_minutes: f64) -> NewTrafficCalculation {
        NewTrafficCalculation {
            origin: origin.to_string(),
            waypoint: None,
            destination: "Downtown".to_string(),
            daily_loss_minutes,
            monthly_loss_hours: daily_loss_minutes * 22.0 / 60.0,
            annual_loss_days: daily_loss_minutes * 250.0 / 1440.0,
            duration_in_traffic_minutes: 40.0,
            normal_duration_minutes: 40.0 - daily_loss_minutes / 2.0,
            distance_km: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryCalculationStore::new();

        let first = store.insert(new_calculation("A", 10.0)).await.unwrap();
        let second = store.insert(new_calculation("B", 20.0)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryCalculationStore::new();

        let first = store.insert(new_calculation("A", 10.0)).await.unwrap();
        assert!(store.delete_by_id(first.id).await.unwrap());

        let second = store.insert(new_calculation("B", 20.0)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let store = InMemoryCalculationStore::new();
        let entity = store.insert(new_calculation("A", 10.0)).await.unwrap();

        let found = store.find_by_id(entity.id).await.unwrap();
        assert_eq!(found, Some(entity.clone()));

        assert!(store.delete_by_id(entity.id).await.unwrap());
        assert!(store.find_by_id(entity.id).await.unwrap().is_none());
        assert!(!store.delete_by_id(entity.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_page_newest_first() {
        let store = InMemoryCalculationStore::new();
        for origin in ["A", "B", "C"] {
            store.insert(new_calculation(origin, 10.0)).await.unwrap();
        }

        let page = store.list_page(10, 0).await.unwrap();
        let origins: Vec<_> = page.iter().map(|e| e.origin.as_str()).collect();
        assert_eq!(origins, vec!["C", "B", "A"]);

        let second = store.list_page(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].origin, "A");

        assert!(store.list_page(2, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_and_averages() {
        let store = InMemoryCalculationStore::new();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.loss_averages().await.unwrap(), LossAverages::default());

        store.insert(new_calculation("A", 10.0)).await.unwrap();
        store.insert(new_calculation("B", 20.0)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        let averages = store.loss_averages().await.unwrap();
        assert_eq!(averages.daily_loss_minutes, Some(15.0));
        assert!(averages.monthly_loss_hours.is_some());
        assert!(averages.annual_loss_days.is_some());
    }

    #[tokio::test]
    async fn test_averages_of_huge_values_stay_finite() {
        let store = InMemoryCalculationStore::new();
        store.insert(new_calculation("A", 1e308)).await.unwrap();
        store.insert(new_calculation("B", 1e308)).await.unwrap();

        let averages = store.loss_averages().await.unwrap();
        assert_eq!(averages.daily_loss_minutes, Some(1e308));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([10.0, 20.0].into_iter()), Some(15.0));
    }

    #[tokio::test]
    async fn test_empty_origin_violates_constraint() {
        let store = InMemoryCalculationStore::new();

        let err = store.insert(new_calculation("", 10.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ping() {
        assert!(InMemoryCalculationStore::new().ping().await.is_ok());
    }
}
