//! Traffic calculation endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use domain::models::{
    CalculationResponse, CalculationStats, CreateCalculationRequest, ListCalculationsResponse,
    NewTrafficCalculation, TrafficCalculation,
};
use shared::pagination::{total_pages, PageRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_calculation_created, record_calculation_deleted};

/// Query parameters for calculation listing.
///
/// Kept as raw strings so malformed numbers surface as validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListCalculationsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Path ids that are not integers are treated like unknown ids.
fn calculation_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound("Calculation not found".to_string()))
}

fn not_found(id: i64) -> ApiError {
    debug!(calculation_id = id, "Calculation not found");
    ApiError::NotFound(format!("Calculation {} not found", id))
}

/// List calculations, newest first.
///
/// GET /api/calculations?page=<n>&per_page=<n>
///
/// Pages past the end return an empty list.
pub async fn list_calculations(
    State(state): State<AppState>,
    Query(query): Query<ListCalculationsQuery>,
) -> Result<Json<ListCalculationsResponse>, ApiError> {
    let page = PageRequest::parse(query.page.as_deref(), query.per_page.as_deref())?;

    let total = state.store.count().await?;
    let rows = state.store.list_page(page.limit(), page.offset()).await?;

    let calculations = rows
        .into_iter()
        .map(|entity| TrafficCalculation::from(entity).to_transport_representation())
        .collect();

    Ok(Json(ListCalculationsResponse {
        calculations,
        total,
        pages: total_pages(total, page.per_page),
        current_page: page.page,
        per_page: page.per_page,
    }))
}

/// Save a new calculation.
///
/// POST /api/calculations
///
/// Returns 201 with the stored record.
/// Returns 400 naming the first missing required field, checked before
/// any field's type.
/// Returns 500 if the write fails; nothing is stored in that case.
pub async fn create_calculation(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CalculationResponse>), ApiError> {
    let Json(body) = payload?;
    let request = CreateCalculationRequest::from_json(body)?;
    let input = NewTrafficCalculation::try_from(request)?;

    let calculation: TrafficCalculation = state.store.insert(input).await?.into();
    record_calculation_created();

    info!(
        calculation_id = calculation.id,
        origin = %calculation.origin,
        destination = %calculation.destination,
        "Traffic calculation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(calculation.to_transport_representation()),
    ))
}

/// Fetch one calculation.
///
/// GET /api/calculations/:id
pub async fn get_calculation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let id = calculation_id(path)?;

    let calculation: TrafficCalculation = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?
        .into();

    Ok(Json(calculation.to_transport_representation()))
}

/// Permanently delete one calculation.
///
/// DELETE /api/calculations/:id
///
/// Returns 204 with no body, or 404 if the id is unknown.
pub async fn delete_calculation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = calculation_id(path)?;

    if !state.store.delete_by_id(id).await? {
        return Err(not_found(id));
    }
    record_calculation_deleted();

    info!(calculation_id = id, "Traffic calculation deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Aggregate stats over all calculations.
///
/// GET /api/calculations/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<CalculationStats>, ApiError> {
    let total = state.store.count().await?;
    if total == 0 {
        return Ok(Json(CalculationStats::empty()));
    }

    let averages = state.store.loss_averages().await?;

    Ok(Json(CalculationStats::new(
        total,
        averages.daily_loss_minutes,
        averages.monthly_loss_hours,
        averages.annual_loss_days,
    )))
}
