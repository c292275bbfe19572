//! Traffic calculation entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the traffic_calculations table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CalculationEntity {
    pub id: i64,
    pub origin: String,
    pub waypoint: Option<String>,
    pub destination: String,
    pub daily_loss_minutes: f64,
    pub monthly_loss_hours: f64,
    pub annual_loss_days: f64,
    pub duration_in_traffic_minutes: f64,
    pub normal_duration_minutes: f64,
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl CalculationEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> domain::models::TrafficCalculation {
        domain::models::TrafficCalculation {
            id: self.id,
            origin: self.origin,
            waypoint: self.waypoint,
            destination: self.destination,
            daily_loss_minutes: self.daily_loss_minutes,
            monthly_loss_hours: self.monthly_loss_hours,
            annual_loss_days: self.annual_loss_days,
            duration_in_traffic_minutes: self.duration_in_traffic_minutes,
            normal_duration_minutes: self.normal_duration_minutes,
            distance_km: self.distance_km,
            created_at: self.created_at,
        }
    }
}

impl From<CalculationEntity> for domain::models::TrafficCalculation {
    fn from(entity: CalculationEntity) -> Self {
        entity.into_domain()
    }
}

/// Raw loss averages over all rows; `None` when the table is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct LossAverages {
    pub daily_loss_minutes: Option<f64>,
    pub monthly_loss_hours: Option<f64>,
    pub annual_loss_days: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TrafficCalculation;

    fn create_test_entity() -> CalculationEntity {
        CalculationEntity {
            id: 42,
            origin: "Avenida Paulista, São Paulo".to_string(),
            waypoint: None,
            destination: "Aeroporto de Congonhas".to_string(),
            daily_loss_minutes: 18.0,
            monthly_loss_hours: 6.6,
            annual_loss_days: 3.3,
            duration_in_traffic_minutes: 47.0,
            normal_duration_minutes: 38.0,
            distance_km: Some(9.7),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = create_test_entity();
        let calculation: TrafficCalculation = entity.clone().into();

        assert_eq!(calculation.id, entity.id);
        assert_eq!(calculation.origin, entity.origin);
        assert_eq!(calculation.waypoint, None);
        assert_eq!(calculation.destination, entity.destination);
        assert_eq!(calculation.daily_loss_minutes, entity.daily_loss_minutes);
        assert_eq!(calculation.monthly_loss_hours, entity.monthly_loss_hours);
        assert_eq!(calculation.annual_loss_days, entity.annual_loss_days);
        assert_eq!(
            calculation.duration_in_traffic_minutes,
            entity.duration_in_traffic_minutes
        );
        assert_eq!(calculation.normal_duration_minutes, entity.normal_duration_minutes);
        assert_eq!(calculation.distance_km, Some(9.7));
        assert_eq!(calculation.created_at, entity.created_at);
    }

    #[test]
    fn test_entity_debug() {
        let entity = create_test_entity();
        let debug_str = format!("{:?}", entity);
        assert!(debug_str.contains("CalculationEntity"));
        assert!(debug_str.contains("Congonhas"));
    }

    #[test]
    fn test_loss_averages_default_is_empty() {
        let averages = LossAverages::default();
        assert!(averages.daily_loss_minutes.is_none());
        assert!(averages.monthly_loss_hours.is_none());
        assert!(averages.annual_loss_days.is_none());
    }
}
