//! Store capability and the persisted reading document

use std::time::Duration;

use agrosense_core::{round2, Reading};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field the producer orders by during recovery
pub const SEQUENCE_FIELD: &str = "sequence";
/// Field the store fills with its own clock at write time
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request never produced a response (DNS, TLS, connection reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Call exceeded its bounded wait
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// Store answered with a non-success status (auth, quota, not found)
    #[error("Store returned HTTP {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response could not be mapped to a reading document
    #[error("Decode error: {0}")]
    Decode(String),

    /// Store is not reachable at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Query on a field the store cannot order by
    #[error("Unsupported field: {0}")]
    UnsupportedField(String),
}

/// One reading as persisted in the `sensor_data` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingDocument {
    /// Producer sequence number
    pub sequence: u64,
    /// Producing device
    #[serde(rename = "sourceIdentifier")]
    pub source_identifier: String,
    /// Rainfall (mm, 2dp)
    pub rain: f64,
    /// Soil moisture (%, 2dp)
    pub soil: f64,
    /// Temperature (Celsius, 2dp)
    pub temp: f64,
    /// Plant health (%, 2dp)
    pub plant_health: f64,
    /// Server-assigned capture time; `None` until the store has written it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReadingDocument {
    /// Numeric value of a field, used for ordering queries
    pub fn numeric_field(&self, field: &str) -> Option<f64> {
        match field {
            SEQUENCE_FIELD => Some(self.sequence as f64),
            "rain" => Some(self.rain),
            "soil" => Some(self.soil),
            "temp" => Some(self.temp),
            "plant_health" => Some(self.plant_health),
            _ => None,
        }
    }
}

impl From<&Reading> for ReadingDocument {
    fn from(reading: &Reading) -> Self {
        Self {
            sequence: reading.sequence,
            source_identifier: reading.source_identifier.clone(),
            rain: round2(reading.rainfall_millimeters),
            soil: round2(reading.soil_moisture_percent),
            temp: round2(reading.temperature_celsius),
            plant_health: round2(reading.plant_health_percent),
            timestamp: None,
        }
    }
}

/// Capability the ingestion side needs from a durable document store.
///
/// Implementations must not block indefinitely; callers additionally bound
/// every call with their own timeout.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Document with the greatest value of `field`, or `None` when the collection is empty
    async fn query_max(&self, field: &str) -> Result<Option<ReadingDocument>, StoreError>;

    /// Create or overwrite the document stored under `key`.
    ///
    /// The store assigns `timestamp` itself; any value on `document` is ignored.
    async fn put(&self, key: &str, document: &ReadingDocument) -> Result<(), StoreError>;
}
