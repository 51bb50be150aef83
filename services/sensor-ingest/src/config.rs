//! Environment configuration of the ingestion service

use std::env;
use std::fmt::Display;
use std::net::UdpSocket;
use std::str::FromStr;
use std::time::Duration;

use agrosense_core::LogFormat;
use agrosense_store::FirestoreConfig;
use thiserror::Error;

const DEFAULT_COLLECTION: &str = "sensor_data";
const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;
const FALLBACK_SOURCE: &str = "127.0.0.1";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset
    #[error("Missing required variable {0}")]
    Missing(&'static str),

    /// A variable is set but unusable
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with the value
        reason: String,
    },
}

/// Where readings are written
#[derive(Debug, Clone)]
pub enum StoreSettings {
    /// Cloud Firestore, or its emulator
    Firestore(FirestoreConfig),
    /// Offline dry run, nothing survives the process
    Memory,
}

/// Ingestion service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Store backend
    pub store: StoreSettings,
    /// Bound on every store call (`STORE_TIMEOUT_MS`, default 10 s)
    pub store_timeout: Duration,
    /// Wait between ticks (`TICK_INTERVAL_SECS`, default 5 s)
    pub tick_interval: Duration,
    /// Producer identity (`SOURCE_IDENTIFIER`, default outbound address)
    pub source_identifier: String,
    /// Log output format (`LOG_FORMAT`)
    pub log_format: LogFormat,
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_timeout =
            Duration::from_millis(parse(&lookup, "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?);
        if store_timeout.is_zero() {
            return Err(invalid("STORE_TIMEOUT_MS", "must be greater than zero"));
        }

        let tick_interval =
            Duration::from_secs(parse(&lookup, "TICK_INTERVAL_SECS", DEFAULT_TICK_INTERVAL_SECS)?);
        if tick_interval.is_zero() {
            return Err(invalid("TICK_INTERVAL_SECS", "must be greater than zero"));
        }

        let backend = lookup("STORE_BACKEND").unwrap_or_else(|| "firestore".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "firestore" => StoreSettings::Firestore(FirestoreConfig {
                project_id: lookup("FIRESTORE_PROJECT_ID")
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::Missing("FIRESTORE_PROJECT_ID"))?,
                database: lookup("FIRESTORE_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                collection: lookup("FIRESTORE_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
                access_token: lookup("FIRESTORE_ACCESS_TOKEN").filter(|v| !v.is_empty()),
                emulator_host: lookup("FIRESTORE_EMULATOR_HOST").filter(|v| !v.is_empty()),
                timeout: store_timeout,
            }),
            "memory" => StoreSettings::Memory,
            other => {
                return Err(invalid(
                    "STORE_BACKEND",
                    format!("expected 'firestore' or 'memory', got '{}'", other),
                ))
            }
        };

        let source_identifier = lookup("SOURCE_IDENTIFIER")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(detect_source_identifier);

        let log_format = parse(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Config {
            store,
            store_timeout,
            tick_interval,
            source_identifier,
            log_format,
        })
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(name, e.to_string())),
        None => Ok(default),
    }
}

/// Address of the interface that routes outbound traffic.
///
/// Connecting a UDP socket sends no packets; it only selects a route.
fn detect_source_identifier() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| FALLBACK_SOURCE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("FIRESTORE_PROJECT_ID", "agro-iot-data"),
            ("SOURCE_IDENTIFIER", "10.0.0.9"),
        ]))
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.store_timeout, Duration::from_millis(10_000));
        assert_eq!(config.source_identifier, "10.0.0.9");
        assert_eq!(config.log_format, LogFormat::Pretty);
        match config.store {
            StoreSettings::Firestore(fs) => {
                assert_eq!(fs.project_id, "agro-iot-data");
                assert_eq!(fs.collection, "sensor_data");
                assert_eq!(fs.database, "(default)");
                assert_eq!(fs.timeout, Duration::from_millis(10_000));
                assert!(fs.access_token.is_none());
            }
            StoreSettings::Memory => panic!("expected firestore backend"),
        }
    }

    #[test]
    fn test_firestore_requires_project() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FIRESTORE_PROJECT_ID")));
    }

    #[test]
    fn test_memory_backend_and_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("TICK_INTERVAL_SECS", "30"),
            ("STORE_TIMEOUT_MS", "250"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert!(matches!(config.store, StoreSettings::Memory));
        assert_eq!(config.tick_interval, Duration::from_secs(30));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.source_identifier.is_empty());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("TICK_INTERVAL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TICK_INTERVAL_SECS", .. }));

        let err = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("TICK_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TICK_INTERVAL_SECS", .. }));

        let err = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "sqlite")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORE_BACKEND", .. }));
    }
}
