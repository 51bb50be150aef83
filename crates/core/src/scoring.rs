//! Plant health scoring
//!
//! Maps soil moisture and temperature to a health percentage and a
//! discrete status label. Rainfall is carried for reporting only.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Weight of soil moisture in the raw score
pub const SOIL_WEIGHT: f64 = 0.6;
/// Weight of normalized temperature in the raw score
pub const TEMPERATURE_WEIGHT: f64 = 0.4;
/// Temperature that normalizes to 1.0
pub const TEMPERATURE_REFERENCE_CELSIUS: f64 = 50.0;
/// Scores below this need water
pub const NEEDS_WATER_BELOW: f64 = 30.0;
/// Scores at or above this are great
pub const GREAT_AT_OR_ABOVE: f64 = 70.0;

/// Plant health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Health < 30
    #[serde(rename = "Needs Water")]
    NeedsWater,
    /// 30 <= health < 70
    Optimal,
    /// Health >= 70
    Great,
}

impl HealthStatus {
    /// Classify a health percentage
    pub fn from_percent(percent: f64) -> Self {
        if percent < NEEDS_WATER_BELOW {
            HealthStatus::NeedsWater
        } else if percent < GREAT_AT_OR_ABOVE {
            HealthStatus::Optimal
        } else {
            HealthStatus::Great
        }
    }

    /// Label used on the wire
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::NeedsWater => "Needs Water",
            HealthStatus::Optimal => "Optimal",
            HealthStatus::Great => "Great",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Environmental inputs of one scoring request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    /// Soil moisture in percent
    pub soil_moisture_percent: f64,
    /// Air temperature in degrees Celsius
    pub temperature_celsius: f64,
    /// Rainfall in millimeters (reported, not scored)
    pub rainfall_millimeters: f64,
}

impl ScoringInput {
    /// Reject NaN and infinite inputs before they reach the formula
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("soil_moisture_percent", self.soil_moisture_percent),
            ("temperature_celsius", self.temperature_celsius),
            ("rainfall_millimeters", self.rainfall_millimeters),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput { field, value });
            }
        }
        Ok(())
    }

    /// Score these inputs
    pub fn score(&self) -> ScoringOutput {
        score(self.soil_moisture_percent, self.temperature_celsius)
    }
}

/// Result of scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutput {
    /// Health in percent, clamped to [0, 100]
    pub plant_health_percent: f64,
    /// Classification of `plant_health_percent`
    pub status: HealthStatus,
}

/// Unclamped health score.
pub fn raw_score(soil_moisture_percent: f64, temperature_celsius: f64) -> f64 {
    soil_moisture_percent * SOIL_WEIGHT
        + (temperature_celsius / TEMPERATURE_REFERENCE_CELSIUS) * TEMPERATURE_WEIGHT * 100.0
}

/// Score plant health from soil moisture and temperature.
///
/// `raw = soil * 0.6 + (temp / 50) * 0.4 * 100`, clamped to `[0, 100]`.
pub fn score(soil_moisture_percent: f64, temperature_celsius: f64) -> ScoringOutput {
    let plant_health_percent = raw_score(soil_moisture_percent, temperature_celsius).clamp(0.0, 100.0);
    ScoringOutput {
        plant_health_percent,
        status: HealthStatus::from_percent(plant_health_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_midrange_is_optimal() {
        let out = score(50.0, 25.0);
        assert!(approx(out.plant_health_percent, 50.0));
        assert_eq!(out.status, HealthStatus::Optimal);
    }

    #[test]
    fn test_zero_inputs_need_water() {
        let out = score(0.0, 0.0);
        assert_eq!(out.plant_health_percent, 0.0);
        assert_eq!(out.status, HealthStatus::NeedsWater);
    }

    #[test]
    fn test_maximum_is_great() {
        let out = score(100.0, 50.0);
        assert!(approx(out.plant_health_percent, 100.0));
        assert_eq!(out.status, HealthStatus::Great);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(score(200.0, 100.0).plant_health_percent, 100.0);
        assert_eq!(score(-50.0, -10.0).plant_health_percent, 0.0);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(HealthStatus::from_percent(29.999), HealthStatus::NeedsWater);
        assert_eq!(HealthStatus::from_percent(30.0), HealthStatus::Optimal);
        assert_eq!(HealthStatus::from_percent(69.999), HealthStatus::Optimal);
        assert_eq!(HealthStatus::from_percent(70.0), HealthStatus::Great);
    }

    #[test]
    fn test_exact_boundary_scores() {
        // soil 50 alone gives exactly 30
        assert_eq!(score(50.0, 0.0).plant_health_percent, 30.0);
        assert_eq!(score(50.0, 0.0).status, HealthStatus::Optimal);
        // 0.4 * 100 at temp 50 gives 40, soil 50 adds 30
        let out = score(50.0, 50.0);
        assert_eq!(out.plant_health_percent, 70.0);
        assert_eq!(out.status, HealthStatus::Great);
    }

    #[test]
    fn test_rainfall_does_not_affect_score() {
        let dry = ScoringInput {
            soil_moisture_percent: 40.0,
            temperature_celsius: 20.0,
            rainfall_millimeters: 0.0,
        };
        let wet = ScoringInput {
            rainfall_millimeters: 12.5,
            ..dry
        };
        assert_eq!(dry.score(), wet.score());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let input = ScoringInput {
            soil_moisture_percent: f64::NAN,
            temperature_celsius: 20.0,
            rainfall_millimeters: 0.0,
        };
        match input.validate() {
            Err(CoreError::InvalidInput { field, .. }) => {
                assert_eq!(field, "soil_moisture_percent")
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_status_serializes_to_label() {
        let json = serde_json::to_string(&HealthStatus::NeedsWater).unwrap();
        assert_eq!(json, "\"Needs Water\"");
        assert_eq!(HealthStatus::Great.to_string(), "Great");
    }
}
