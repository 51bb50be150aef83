//! Sensor ingestion service
//!
//! Simulates an agricultural sensor: recovers the last persisted sequence,
//! then writes one synthetic reading per tick to the document store until
//! cancelled.

#![warn(missing_docs)]

pub mod config;
pub mod ingest;
pub mod recovery;

pub use config::{Config, ConfigError, StoreSettings};
pub use ingest::{
    Clock, IngestPhase, IngestReport, IngestSettings, IngestionLoop, SequenceState, TokioClock,
};
pub use recovery::recover;
