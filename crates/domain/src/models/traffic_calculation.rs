//! Traffic calculation domain model.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use shared::rounding::round_to;

/// Required fields of a create payload, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "origin",
    "destination",
    "daily_loss_minutes",
    "monthly_loss_hours",
    "annual_loss_days",
    "duration_in_traffic_minutes",
    "normal_duration_minutes",
];

/// Decimal places used for averaged losses in stats.
const STATS_DECIMAL_PLACES: u32 = 2;

// ============================================================================
// Core Model
// ============================================================================

/// A saved traffic calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficCalculation {
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

impl TrafficCalculation {
    /// Flat wire form of the record, with `created_at` as an ISO-8601 string.
    pub fn to_transport_representation(&self) -> CalculationResponse {
        CalculationResponse {
            id: self.id,
            origin: self.origin.clone(),
            waypoint: self.waypoint.clone(),
            destination: self.destination.clone(),
            daily_loss_minutes: self.daily_loss_minutes,
            monthly_loss_hours: self.monthly_loss_hours,
            annual_loss_days: self.annual_loss_days,
            duration_in_traffic_minutes: self.duration_in_traffic_minutes,
            normal_duration_minutes: self.normal_duration_minutes,
            distance_km: self.distance_km,
            created_at: self
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// A calculation that passed boundary validation and is ready to store.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewTrafficCalculation {
    #[validate(length(min = 1, max = 255, message = "origin must be 1-255 characters"))]
    pub origin: String,

    #[validate(length(max = 255, message = "waypoint must be at most 255 characters"))]
    pub waypoint: Option<String>,

    #[validate(length(min = 1, max = 255, message = "destination must be 1-255 characters"))]
    pub destination: String,

    pub daily_loss_minutes: f64,
    pub monthly_loss_hours: f64,
    pub annual_loss_days: f64,
    pub duration_in_traffic_minutes: f64,
    pub normal_duration_minutes: f64,
    pub distance_km: Option<f64>,
}

// ============================================================================
// Errors
// ============================================================================

/// Rejection of a create payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidType { field: &'static str, reason: String },

    #[error("{0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for CalculationValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        let message = field_errors
            .first()
            .and_then(|(field, errors)| {
                errors.first().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .unwrap_or_else(|| "Invalid calculation".to_string());

        CalculationValidationError::Invalid(message)
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for creating a calculation.
///
/// Every field is optional at the decoding step so that a missing field can
/// be reported by name; `TryFrom` turns it into a `NewTrafficCalculation`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCalculationRequest {
    pub origin: Option<String>,
    pub waypoint: Option<String>,
    pub destination: Option<String>,
    pub daily_loss_minutes: Option<f64>,
    pub monthly_loss_hours: Option<f64>,
    pub annual_loss_days: Option<f64>,
    pub duration_in_traffic_minutes: Option<f64>,
    pub normal_duration_minutes: Option<f64>,
    pub distance_km: Option<f64>,
}

impl CreateCalculationRequest {
    /// Decodes a raw JSON body.
    ///
    /// Presence of every required field is checked before any value is
    /// type-checked, so a missing field is reported even when a later field
    /// has the wrong type. Null counts as missing.
    pub fn from_json(body: Value) -> Result<Self, CalculationValidationError> {
        let Value::Object(fields) = body else {
            return Err(CalculationValidationError::Invalid(
                "Request body must be a JSON object".to_string(),
            ));
        };

        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|name| fields.get(**name).map_or(true, Value::is_null))
        {
            return Err(CalculationValidationError::MissingField(*missing));
        }

        Ok(Self {
            origin: typed_field(&fields, "origin")?,
            waypoint: typed_field(&fields, "waypoint")?,
            destination: typed_field(&fields, "destination")?,
            daily_loss_minutes: typed_field(&fields, "daily_loss_minutes")?,
            monthly_loss_hours: typed_field(&fields, "monthly_loss_hours")?,
            annual_loss_days: typed_field(&fields, "annual_loss_days")?,
            duration_in_traffic_minutes: typed_field(&fields, "duration_in_traffic_minutes")?,
            normal_duration_minutes: typed_field(&fields, "normal_duration_minutes")?,
            distance_km: typed_field(&fields, "distance_km")?,
        })
    }
}

fn typed_field<T: DeserializeOwned>(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<T>, CalculationValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| CalculationValidationError::InvalidType {
                field,
                reason: e.to_string(),
            }),
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, CalculationValidationError> {
    value.ok_or(CalculationValidationError::MissingField(field))
}

impl TryFrom<CreateCalculationRequest> for NewTrafficCalculation {
    type Error = CalculationValidationError;

    fn try_from(request: CreateCalculationRequest) -> Result<Self, Self::Error> {
        // Field order follows REQUIRED_FIELDS so the first missing one is reported.
        let origin = require(request.origin, REQUIRED_FIELDS[0])?;
        let destination = require(request.destination, REQUIRED_FIELDS[1])?;
        let daily_loss_minutes = require(request.daily_loss_minutes, REQUIRED_FIELDS[2])?;
        let monthly_loss_hours = require(request.monthly_loss_hours, REQUIRED_FIELDS[3])?;
        let annual_loss_days = require(request.annual_loss_days, REQUIRED_FIELDS[4])?;
        let duration_in_traffic_minutes =
            require(request.duration_in_traffic_minutes, REQUIRED_FIELDS[5])?;
        let normal_duration_minutes =
            require(request.normal_duration_minutes, REQUIRED_FIELDS[6])?;

        let calculation = NewTrafficCalculation {
            origin,
            waypoint: request.waypoint,
            destination,
            daily_loss_minutes,
            monthly_loss_hours,
            annual_loss_days,
            duration_in_traffic_minutes,
            normal_duration_minutes,
            distance_km: request.distance_km,
        };
        calculation.validate()?;

        Ok(calculation)
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Wire form of a single calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
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
    pub created_at: String,
}

/// Response for the paginated calculation listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCalculationsResponse {
    pub calculations: Vec<CalculationResponse>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub per_page: i64,
}

/// Aggregate statistics across all stored calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStats {
    pub total_calculations: i64,
    pub average_daily_loss: f64,
    pub average_monthly_loss: f64,
    pub average_annual_loss: f64,
}

impl CalculationStats {
    /// Builds stats from a row count and raw averages.
    ///
    /// Averages are rounded to two decimals; missing averages (empty table)
    /// are reported as zero.
    pub fn new(
        total_calculations: i64,
        average_daily_loss: Option<f64>,
        average_monthly_loss: Option<f64>,
        average_annual_loss: Option<f64>,
    ) -> Self {
        if total_calculations == 0 {
            return Self::empty();
        }

        let round = |avg: Option<f64>| {
            avg.map(|v| round_to(v, STATS_DECIMAL_PLACES))
                .unwrap_or(0.0)
        };

        Self {
            total_calculations,
            average_daily_loss: round(average_daily_loss),
            average_monthly_loss: round(average_monthly_loss),
            average_annual_loss: round(average_annual_loss),
        }
    }

    /// Stats for an empty store.
    pub fn empty() -> Self {
        Self {
            total_calculations: 0,
            average_daily_loss: 0.0,
            average_monthly_loss: 0.0,
            average_annual_loss: 0.0,
        }
    }
}
