//! Running statistics over the readings of one ingestion session

use serde::{Deserialize, Serialize};

use crate::analysis::{Parameter, ParameterStatus};
use crate::reading::{round2, Reading};

/// Aggregates of every reading generated in a session, plus write outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Readings generated
    pub readings: u64,
    /// Writes acknowledged by the store
    pub writes_succeeded: u64,
    /// Writes that failed or timed out
    pub writes_failed: u64,
    /// Sequence of the first reading
    pub first_sequence: Option<u64>,
    /// Sequence of the last reading
    pub last_sequence: Option<u64>,
    /// Reading values that fell in a warning band
    pub warning_events: u64,
    /// Reading values that fell in a critical band
    pub critical_events: u64,
    soil_sum: f64,
    temperature_sum: f64,
    rainfall_total: f64,
    plant_health_sum: f64,
}

impl SessionStats {
    /// Empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a reading into the aggregates
    pub fn record_reading(&mut self, reading: &Reading) {
        self.readings += 1;
        self.first_sequence.get_or_insert(reading.sequence);
        self.last_sequence = Some(reading.sequence);
        self.soil_sum += reading.soil_moisture_percent;
        self.temperature_sum += reading.temperature_celsius;
        self.rainfall_total += reading.rainfall_millimeters;
        self.plant_health_sum += reading.plant_health_percent;

        for parameter in Parameter::ALL {
            match parameter.classify(parameter.value_of(reading)) {
                ParameterStatus::Warning => self.warning_events += 1,
                ParameterStatus::Critical => self.critical_events += 1,
                ParameterStatus::Normal => {}
            }
        }
    }

    /// Record the outcome of a write
    pub fn record_write(&mut self, succeeded: bool) {
        if succeeded {
            self.writes_succeeded += 1;
        } else {
            self.writes_failed += 1;
        }
    }

    fn average(&self, sum: f64) -> f64 {
        if self.readings == 0 {
            0.0
        } else {
            round2(sum / self.readings as f64)
        }
    }

    /// Average soil moisture (0 when empty)
    pub fn avg_soil_moisture(&self) -> f64 {
        self.average(self.soil_sum)
    }

    /// Average temperature (0 when empty)
    pub fn avg_temperature(&self) -> f64 {
        self.average(self.temperature_sum)
    }

    /// Total rainfall
    pub fn total_rainfall(&self) -> f64 {
        round2(self.rainfall_total)
    }

    /// Average plant health (0 when empty)
    pub fn avg_plant_health(&self) -> f64 {
        self.average(self.plant_health_sum)
    }
}
