//! Core functionality for the AgroSense telemetry system.
//!
//! This crate provides the reading model, the plant health scoring
//! function, the synthetic generators used by both services, and the
//! shared logging setup.

#![warn(missing_docs)]

pub mod analysis;
pub mod error;
pub mod generator;
pub mod logging;
pub mod reading;
pub mod scoring;
pub mod stats;

pub use analysis::{HealthReport, OverallStatus, Parameter, ParameterStatus};
pub use error::{CoreError, Result};
pub use generator::{ConditionsSampler, ReadingGenerator};
pub use logging::LogFormat;
pub use reading::{document_id, round2, Reading};
pub use scoring::{score, HealthStatus, ScoringInput, ScoringOutput};
pub use stats::SessionStats;
