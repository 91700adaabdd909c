use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde_json::Value;

use crate::{
    error::ApiError,
    models::estimate::{CarbonResponse, EnergyGraphData, EnergyUsageResponse},
};

/// Emission and consumption coefficients used by the estimators. Injected
/// through `AppState` so tests can supply alternate values.
#[derive(Debug, Clone)]
pub struct EstimateFactors {
    /// kg CO2e per mile (average UK car, 2023)
    pub transport_kg_per_mile: f64,
    /// kg CO2e per kWh (UK grid average, 2023)
    pub electricity_kg_per_kwh: f64,
    /// kg CO2e per meat meal (general estimate)
    pub meat_meal_kg: f64,
    /// kg CO2e per kWh (natural gas, 2023)
    pub gas_kg_per_kwh: f64,
    /// kg CO2e per tonne of waste (general estimate)
    pub waste_kg_per_tonne: f64,
    /// UK average individual footprint in tonnes CO2e
    pub individual_average_tonnes: f64,
    /// UK average commercial footprint in tonnes CO2e
    pub commercial_average_tonnes: f64,
    /// UK average daily electricity usage in kWh
    pub national_daily_kwh: f64,
}

impl Default for EstimateFactors {
    fn default() -> Self {
        Self {
            transport_kg_per_mile: 0.18294,
            electricity_kg_per_kwh: 0.19338,
            meat_meal_kg: 2.0,
            gas_kg_per_kwh: 0.18316,
            waste_kg_per_tonne: 403.0,
            individual_average_tonnes: 4.6,
            commercial_average_tonnes: 15.0,
            national_daily_kwh: 7.4,
        }
    }
}

/// Annual footprint for an individual: annual transport miles, monthly
/// electricity kWh, weekly meat meals.
pub fn individual_footprint(
    factors: &EstimateFactors,
    transport_miles: f64,
    monthly_kwh: f64,
    weekly_meat_meals: f64,
) -> Result<CarbonResponse, ApiError> {
    if transport_miles < 0.0 || monthly_kwh < 0.0 || weekly_meat_meals < 0.0 {
        return Err(ApiError::validation("Values cannot be negative"));
    }

    let annual_kwh = monthly_kwh * 12.0;
    let annual_meals = weekly_meat_meals * 52.0;

    let kg = transport_miles * factors.transport_kg_per_mile
        + annual_kwh * factors.electricity_kg_per_kwh
        + annual_meals * factors.meat_meal_kg;

    Ok(CarbonResponse {
        footprint: round2(kg / 1000.0),
        average: factors.individual_average_tonnes,
    })
}

/// Annual footprint for a commercial property: monthly electricity kWh,
/// monthly gas kWh, annual waste tonnes.
pub fn commercial_footprint(
    factors: &EstimateFactors,
    monthly_kwh: f64,
    monthly_gas_kwh: f64,
    annual_waste_tonnes: f64,
) -> Result<CarbonResponse, ApiError> {
    if monthly_kwh < 0.0 || monthly_gas_kwh < 0.0 || annual_waste_tonnes < 0.0 {
        return Err(ApiError::validation("Values cannot be negative"));
    }

    let annual_kwh = monthly_kwh * 12.0;
    let annual_gas_kwh = monthly_gas_kwh * 12.0;

    let kg = annual_kwh * factors.electricity_kg_per_kwh
        + annual_gas_kwh * factors.gas_kg_per_kwh
        + annual_waste_tonnes * factors.waste_kg_per_tonne;

    Ok(CarbonResponse {
        footprint: round2(kg / 1000.0),
        average: factors.commercial_average_tonnes,
    })
}

/// Coerce a JSON field to a number. Browser forms submit numbers or numeric
/// strings interchangeably; absent, null and blank values count as zero.
pub fn parse_metric(value: Option<&Value>) -> Result<f64, ApiError> {
    let invalid = || ApiError::validation("Invalid input - please enter numeric values");
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// A week of sample daily usage, in kWh. Real meter integration does not
/// exist yet, so the series is sampled the way the product demo expects.
pub fn sample_daily_usage() -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..7).map(|_| rng.gen_range(3..=7) as f64).collect()
}

/// Build the energy usage payload from a week of daily values ending today.
pub fn energy_usage_week(
    factors: &EstimateFactors,
    today: NaiveDate,
    user_values: Vec<f64>,
) -> EnergyUsageResponse {
    let days = user_values.len() as i64;
    let labels = (0..days)
        .rev()
        .map(|offset| (today - Duration::days(offset)).format("%d/%m").to_string())
        .collect();

    let daily_usage = user_values.last().copied().unwrap_or(0.0);
    let weekly_usage: f64 = user_values.iter().sum();
    let monthly_usage = (weekly_usage * 4.0).round();
    let avg_daily_usage = if user_values.is_empty() {
        0.0
    } else {
        round1(weekly_usage / user_values.len() as f64)
    };

    EnergyUsageResponse {
        success: true,
        graph_data: EnergyGraphData {
            labels,
            national_average: vec![factors.national_daily_kwh; user_values.len()],
            user_values,
        },
        daily_usage,
        weekly_usage,
        monthly_usage,
        avg_daily_usage,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn individual_footprint_matches_hand_computation() {
        let factors = EstimateFactors::default();
        // 5000 miles, 250 kWh/month, 4 meat meals/week:
        // 5000*0.18294 + 3000*0.19338 + 208*2.0 = 1910.84 kg -> 1.91 t
        let result = individual_footprint(&factors, 5000.0, 250.0, 4.0).unwrap();
        assert_eq!(result.footprint, 1.91);
        assert_eq!(result.average, 4.6);
    }

    #[test]
    fn commercial_footprint_matches_hand_computation() {
        let factors = EstimateFactors::default();
        // 2000 kWh/month, 1500 kWh gas/month, 12 t waste:
        // 24000*0.19338 + 18000*0.18316 + 12*403.0 = 12774.0 kg -> 12.77 t
        let result = commercial_footprint(&factors, 2000.0, 1500.0, 12.0).unwrap();
        assert_eq!(result.footprint, 12.77);
        assert_eq!(result.average, 15.0);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let factors = EstimateFactors::default();
        assert!(individual_footprint(&factors, -1.0, 0.0, 0.0).is_err());
        assert!(commercial_footprint(&factors, 0.0, -5.0, 0.0).is_err());
    }

    #[test]
    fn alternate_factors_flow_through() {
        let factors = EstimateFactors {
            transport_kg_per_mile: 1.0,
            electricity_kg_per_kwh: 0.0,
            meat_meal_kg: 0.0,
            individual_average_tonnes: 9.9,
            ..EstimateFactors::default()
        };
        let result = individual_footprint(&factors, 1000.0, 100.0, 10.0).unwrap();
        assert_eq!(result.footprint, 1.0);
        assert_eq!(result.average, 9.9);
    }

    #[test]
    fn metrics_coerce_numbers_strings_and_blanks() {
        assert_eq!(parse_metric(None).unwrap(), 0.0);
        assert_eq!(parse_metric(Some(&Value::Null)).unwrap(), 0.0);
        assert_eq!(parse_metric(Some(&json!(12.5))).unwrap(), 12.5);
        assert_eq!(parse_metric(Some(&json!("250"))).unwrap(), 250.0);
        assert_eq!(parse_metric(Some(&json!(" 3.5 "))).unwrap(), 3.5);
        assert_eq!(parse_metric(Some(&json!(""))).unwrap(), 0.0);
        assert!(parse_metric(Some(&json!("abc"))).is_err());
        assert!(parse_metric(Some(&json!([1, 2]))).is_err());
    }

    #[test]
    fn energy_usage_statistics() {
        let factors = EstimateFactors::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let values = vec![3.0, 4.0, 5.0, 6.0, 7.0, 4.0, 6.0];

        let usage = energy_usage_week(&factors, today, values);
        assert_eq!(usage.daily_usage, 6.0);
        assert_eq!(usage.weekly_usage, 35.0);
        assert_eq!(usage.monthly_usage, 140.0);
        assert_eq!(usage.avg_daily_usage, 5.0);
        assert_eq!(usage.graph_data.labels.len(), 7);
        assert_eq!(usage.graph_data.labels[0], "01/06");
        assert_eq!(usage.graph_data.labels[6], "07/06");
        assert_eq!(usage.graph_data.national_average, vec![7.4; 7]);
    }

    #[test]
    fn sampled_usage_stays_in_range() {
        let values = sample_daily_usage();
        assert_eq!(values.len(), 7);
        assert!(values.iter().all(|v| (3.0..=7.0).contains(v)));
    }
}
