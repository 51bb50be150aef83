//! Route handlers

use agrosense_core::{round2, ConditionsSampler, HealthStatus, ScoringInput};
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Status text of a live service
pub const HEALTH_MESSAGE: &str = "Backend is running";

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always [`HEALTH_MESSAGE`]
    pub status: String,
    /// Server time, RFC 3339 UTC
    pub timestamp: String,
}

/// Body of `GET /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Soil moisture in percent
    pub soil_moisture: f64,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Rainfall in millimeters
    pub rainfall: f64,
    /// Health score in percent, 2 decimals
    pub plant_health: f64,
    /// Classification of `plant_health`
    pub health_status: HealthStatus,
    /// Server time, RFC 3339 UTC
    pub timestamp: String,
}

/// Liveness check; answers whenever the server is accepting requests
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_MESSAGE.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Score freshly sampled conditions.
///
/// Each request builds its own sampler, so requests share no mutable state.
pub async fn predict() -> Result<Json<PredictResponse>, ApiError> {
    let mut sampler = ConditionsSampler::new()?;
    let input = sampler.sample();
    debug!(?input, "sampled conditions");
    Ok(Json(prediction(input)?))
}

/// Build the response for one set of conditions.
///
/// Values are rounded to 2 decimals and the status is derived from the
/// rounded health so the two fields never disagree.
pub fn prediction(input: ScoringInput) -> Result<PredictResponse, ApiError> {
    input.validate()?;
    let plant_health = round2(input.score().plant_health_percent);

    Ok(PredictResponse {
        soil_moisture: round2(input.soil_moisture_percent),
        temperature: round2(input.temperature_celsius),
        rainfall: round2(input.rainfall_millimeters),
        plant_health,
        health_status: HealthStatus::from_percent(plant_health),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(soil: f64, temp: f64, rain: f64) -> ScoringInput {
        ScoringInput {
            soil_moisture_percent: soil,
            temperature_celsius: temp,
            rainfall_millimeters: rain,
        }
    }

    #[test]
    fn test_prediction_scores_inputs() {
        let response = prediction(input(50.0, 25.0, 3.14159)).unwrap();
        assert_eq!(response.plant_health, 50.0);
        assert_eq!(response.health_status, HealthStatus::Optimal);
        assert_eq!(response.rainfall, 3.14);
    }

    #[test]
    fn test_prediction_statuses() {
        assert_eq!(
            prediction(input(10.0, 5.0, 0.0)).unwrap().health_status,
            HealthStatus::NeedsWater
        );
        assert_eq!(
            prediction(input(90.0, 40.0, 0.0)).unwrap().health_status,
            HealthStatus::Great
        );
    }

    #[test]
    fn test_prediction_rejects_non_finite_input() {
        let result = prediction(input(50.0, f64::INFINITY, 0.0));
        assert!(matches!(result, Err(ApiError::Core(_))));
    }

    #[test]
    fn test_wire_format() {
        let response = prediction(input(50.0, 25.0, 0.0)).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        for key in [
            "soil_moisture",
            "temperature",
            "rainfall",
            "plant_health",
            "health_status",
            "timestamp",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["health_status"], "Optimal");
    }
}
