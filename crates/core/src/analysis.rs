//! Field condition analysis
//!
//! Classifies each monitored parameter against fixed threshold bands on a
//! 0-100 scale and rolls a session's statistics up into a health report.
//!
//! Band checks are inclusive on both ends and critical bands are tested
//! before warning bands, so a value on a shared edge takes the worse status.
//! Values outside every band count as normal.

use serde::{Deserialize, Serialize};

use crate::reading::Reading;
use crate::stats::SessionStats;

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower bound, inclusive
    pub min: f64,
    /// Upper bound, inclusive
    pub max: f64,
}

impl Band {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies within the band, bounds included
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Threshold bands of one parameter
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Optimal band
    pub normal: Band,
    /// Bands reported as warnings
    pub warning: &'static [Band],
    /// Bands reported as critical
    pub critical: &'static [Band],
}

const SOIL_THRESHOLDS: Thresholds = Thresholds {
    normal: Band::new(40.0, 70.0),
    warning: &[Band::new(25.0, 40.0), Band::new(70.0, 85.0)],
    critical: &[Band::new(0.0, 25.0), Band::new(85.0, 100.0)],
};

const TEMPERATURE_THRESHOLDS: Thresholds = Thresholds {
    normal: Band::new(40.0, 60.0),
    warning: &[Band::new(25.0, 40.0), Band::new(60.0, 75.0)],
    critical: &[Band::new(0.0, 25.0), Band::new(75.0, 100.0)],
};

const RAIN_THRESHOLDS: Thresholds = Thresholds {
    normal: Band::new(0.0, 40.0),
    warning: &[Band::new(40.0, 70.0)],
    critical: &[Band::new(70.0, 100.0)],
};

const PLANT_HEALTH_THRESHOLDS: Thresholds = Thresholds {
    normal: Band::new(70.0, 100.0),
    warning: &[Band::new(40.0, 70.0)],
    critical: &[Band::new(0.0, 40.0)],
};

/// Hours a session's rainfall total is spread over before classification
pub const RAINFALL_HOURS: f64 = 24.0;

/// Monitored parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Soil moisture
    Soil,
    /// Temperature
    Temp,
    /// Rainfall
    Rain,
    /// Plant health index
    PlantHealth,
}

impl Parameter {
    /// Every parameter carried by a reading
    pub const ALL: [Parameter; 4] = [
        Parameter::Soil,
        Parameter::Temp,
        Parameter::Rain,
        Parameter::PlantHealth,
    ];

    /// Threshold bands of this parameter
    pub fn thresholds(&self) -> &'static Thresholds {
        match self {
            Parameter::Soil => &SOIL_THRESHOLDS,
            Parameter::Temp => &TEMPERATURE_THRESHOLDS,
            Parameter::Rain => &RAIN_THRESHOLDS,
            Parameter::PlantHealth => &PLANT_HEALTH_THRESHOLDS,
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Soil => "Soil Moisture",
            Parameter::Temp => "Temperature",
            Parameter::Rain => "Rainfall",
            Parameter::PlantHealth => "Plant Health Index",
        }
    }

    /// Raw value of this parameter in `reading`
    pub fn value_of(&self, reading: &Reading) -> f64 {
        match self {
            Parameter::Soil => reading.soil_moisture_percent,
            Parameter::Temp => reading.temperature_celsius,
            Parameter::Rain => reading.rainfall_millimeters,
            Parameter::PlantHealth => reading.plant_health_percent,
        }
    }

    /// Classify a value of this parameter
    pub fn classify(&self, value: f64) -> ParameterStatus {
        let thresholds = self.thresholds();
        if thresholds.critical.iter().any(|band| band.contains(value)) {
            ParameterStatus::Critical
        } else if thresholds.warning.iter().any(|band| band.contains(value)) {
            ParameterStatus::Warning
        } else {
            ParameterStatus::Normal
        }
    }
}

/// Status of one parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStatus {
    /// Inside the optimal band or outside every band
    Normal,
    /// Inside a warning band
    Warning,
    /// Inside a critical band
    Critical,
}

/// Overall classification of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    /// Score >= 70
    Healthy,
    /// 40 <= score < 70
    Moderate,
    /// Score < 40
    Poor,
}

impl OverallStatus {
    /// Classify an overall score
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            OverallStatus::Healthy
        } else if score >= 40.0 {
            OverallStatus::Moderate
        } else {
            OverallStatus::Poor
        }
    }
}

/// Score a value against its optimal band.
///
/// 100 inside the band, minus 2 per unit of distance outside it, floored at 0.
pub fn parameter_score(value: f64, optimal: Band) -> f64 {
    let distance = if value < optimal.min {
        optimal.min - value
    } else if value > optimal.max {
        value - optimal.max
    } else {
        0.0
    };
    (100.0 - distance * 2.0).max(0.0)
}

/// Rainfall score: full marks up to 40 per hour, minus 2 per unit above
fn rainfall_score(total_rainfall: f64) -> f64 {
    let hourly = (total_rainfall / RAINFALL_HOURS).min(100.0);
    if hourly <= 40.0 {
        100.0
    } else {
        (100.0 - (hourly - 40.0) * 2.0).max(0.0)
    }
}

const PLANT_HEALTH_WEIGHT: f64 = 0.35;
const SOIL_WEIGHT: f64 = 0.25;
const TEMPERATURE_WEIGHT: f64 = 0.20;
const RAINFALL_WEIGHT: f64 = 0.05;

/// Weighted 0-100 score of session averages, rounded to an integer
pub fn overall_score(stats: &SessionStats) -> f64 {
    let weighted = [
        (stats.avg_plant_health(), PLANT_HEALTH_WEIGHT),
        (
            parameter_score(stats.avg_soil_moisture(), SOIL_THRESHOLDS.normal),
            SOIL_WEIGHT,
        ),
        (
            parameter_score(stats.avg_temperature(), TEMPERATURE_THRESHOLDS.normal),
            TEMPERATURE_WEIGHT,
        ),
        (rainfall_score(stats.total_rainfall()), RAINFALL_WEIGHT),
    ];

    let total_weight: f64 = weighted.iter().map(|(_, weight)| weight).sum();
    let total_score: f64 = weighted.iter().map(|(score, weight)| score * weight).sum();
    (total_score / total_weight).round()
}

/// Session-level status of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter summarized
    pub parameter: Parameter,
    /// Session average (total for rainfall)
    pub value: f64,
    /// Status of the session value
    pub status: ParameterStatus,
}

/// Health report of one ingestion session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Readings the report covers
    pub readings: u64,
    /// Weighted score, 0-100
    pub overall_score: f64,
    /// Classification of `overall_score`
    pub overall_status: OverallStatus,
    /// Per-parameter statuses of the session values
    pub parameters: Vec<ParameterSummary>,
    /// Individual parameter values that fell in a warning band
    pub warning_events: u64,
    /// Individual parameter values that fell in a critical band
    pub critical_events: u64,
}

impl HealthReport {
    /// Build the report from accumulated session statistics
    pub fn from_stats(stats: &SessionStats) -> Self {
        let overall_score = overall_score(stats);
        let parameters = Parameter::ALL
            .iter()
            .map(|&parameter| {
                let (value, classified) = match parameter {
                    Parameter::Soil => (stats.avg_soil_moisture(), stats.avg_soil_moisture()),
                    Parameter::Temp => (stats.avg_temperature(), stats.avg_temperature()),
                    Parameter::Rain => (
                        stats.total_rainfall(),
                        stats.total_rainfall() / RAINFALL_HOURS,
                    ),
                    Parameter::PlantHealth => {
                        (stats.avg_plant_health(), stats.avg_plant_health())
                    }
                };
                ParameterSummary {
                    parameter,
                    value,
                    status: parameter.classify(classified),
                }
            })
            .collect();

        Self {
            readings: stats.readings,
            overall_score,
            overall_status: OverallStatus::from_score(overall_score),
            parameters,
            warning_events: stats.warning_events,
            critical_events: stats.critical_events,
        }
    }

    /// Summary of `parameter`
    pub fn parameter(&self, parameter: Parameter) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|s| s.parameter == parameter)
    }
}
