//! Sensor reading model and document identifiers

use serde::{Deserialize, Serialize};

/// Prefix of every reading document key.
pub const DOCUMENT_ID_PREFIX: &str = "data_";

/// Minimum number of digits in a document key; longer sequences are not truncated.
pub const DOCUMENT_ID_WIDTH: usize = 6;

/// One synthetic agricultural reading.
///
/// Readings are immutable once generated. The capture timestamp is not part
/// of the reading; the store assigns it at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Position in the producer's sequence (strictly increasing, never reused)
    pub sequence: u64,
    /// Producing device, e.g. its network address
    pub source_identifier: String,
    /// Soil moisture in percent
    pub soil_moisture_percent: f64,
    /// Air temperature in degrees Celsius
    pub temperature_celsius: f64,
    /// Rainfall in millimeters
    pub rainfall_millimeters: f64,
    /// Plant health in percent
    pub plant_health_percent: f64,
}

impl Reading {
    /// Document key this reading is persisted under.
    pub fn document_id(&self) -> String {
        document_id(self.sequence)
    }
}

/// Format the deterministic document key for a sequence number.
///
/// ```
/// assert_eq!(agrosense_core::document_id(42), "data_000042");
/// ```
pub fn document_id(sequence: u64) -> String {
    format!(
        "{}{:0width$}",
        DOCUMENT_ID_PREFIX,
        sequence,
        width = DOCUMENT_ID_WIDTH
    )
}

/// Round to two decimal digits.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_zero_padded() {
        assert_eq!(document_id(1), "data_000001");
        assert_eq!(document_id(42), "data_000042");
        assert_eq!(document_id(999_999), "data_999999");
    }

    #[test]
    fn test_document_id_grows_past_width() {
        assert_eq!(document_id(1_000_000), "data_1000000");
        assert_eq!(document_id(12_345_678), "data_12345678");
    }

    #[test]
    fn test_document_id_injective_over_range() {
        let ids: std::collections::HashSet<String> = (0..5_000).map(document_id).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(30.0), 30.0);
        assert_eq!(round2(-1.005_1), -1.01);
    }

    #[test]
    fn test_reading_document_id() {
        let reading = Reading {
            sequence: 7,
            source_identifier: "10.0.0.7".to_string(),
            soil_moisture_percent: 50.0,
            temperature_celsius: 25.0,
            rainfall_millimeters: 1.0,
            plant_health_percent: 80.0,
        };
        assert_eq!(reading.document_id(), "data_000007");
    }
}
