use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of POST /get-carbon. Numeric fields are accepted as JSON numbers or
/// numeric strings (browser forms send either), so they arrive untyped and
/// are coerced by the estimator.
#[derive(Debug, Deserialize)]
pub struct CarbonRequest {
    /// "individual" or "commercial"; anything else falls back to commercial.
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub transport_miles: Option<Value>,
    #[serde(default)]
    pub electricity_kwh: Option<Value>,
    #[serde(default)]
    pub meat_meals: Option<Value>,
    #[serde(default)]
    pub gas_kwh: Option<Value>,
    #[serde(default)]
    pub waste_tonnes: Option<Value>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CarbonResponse {
    /// Tonnes of CO2e per year, rounded to 2 decimal places.
    pub footprint: f64,
    /// UK average for the same category, for comparison.
    pub average: f64,
}

/// Series handed to the client-side graph.
#[derive(Debug, Serialize)]
pub struct EnergyGraphData {
    /// Day labels, DD/MM, oldest first.
    pub labels: Vec<String>,
    pub user_values: Vec<f64>,
    pub national_average: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct EnergyUsageResponse {
    pub success: bool,
    pub graph_data: EnergyGraphData,
    pub daily_usage: f64,
    pub weekly_usage: f64,
    pub monthly_usage: f64,
    pub avg_daily_usage: f64,
}
