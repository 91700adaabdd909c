use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::estimate::CarbonRequest,
    services::estimates::{
        commercial_footprint, energy_usage_week, individual_footprint, parse_metric,
        sample_daily_usage,
    },
    AppState,
};

fn estimate_error(err: ApiError) -> (StatusCode, Json<Value>) {
    err.log();
    (err.status(), Json(json!({ "error": err.to_string() })))
}

/// POST /get-carbon
pub async fn calculate_carbon(
    State(state): State<AppState>,
    Json(body): Json<CarbonRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let result = if body.user_type.as_deref() == Some("individual") {
        let miles = parse_metric(body.transport_miles.as_ref()).map_err(estimate_error)?;
        let kwh = parse_metric(body.electricity_kwh.as_ref()).map_err(estimate_error)?;
        let meals = parse_metric(body.meat_meals.as_ref()).map_err(estimate_error)?;
        individual_footprint(&state.factors, miles, kwh, meals).map_err(estimate_error)?
    } else {
        let kwh = parse_metric(body.electricity_kwh.as_ref()).map_err(estimate_error)?;
        let gas = parse_metric(body.gas_kwh.as_ref()).map_err(estimate_error)?;
        let waste = parse_metric(body.waste_tonnes.as_ref()).map_err(estimate_error)?;
        commercial_footprint(&state.factors, kwh, gas, waste).map_err(estimate_error)?
    };

    Ok(Json(serde_json::to_value(result).unwrap()))
}

/// GET /api/energy-usage — the current week's usage series and statistics.
pub async fn energy_usage(State(state): State<AppState>) -> Json<Value> {
    let today = Utc::now().date_naive();
    let usage = energy_usage_week(&state.factors, today, sample_daily_usage());
    Json(serde_json::to_value(usage).unwrap())
}
