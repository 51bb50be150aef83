//! Environment configuration of the scoring service

use std::env;
use std::net::IpAddr;

use agrosense_core::LogFormat;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but unusable
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with the value
        reason: String,
    },
}

/// Scoring service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`PORT`, default 5000)
    pub port: u16,
    /// Listen address (`BIND_ADDRESS`, default 0.0.0.0)
    pub bind_address: IpAddr,
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
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::Invalid {
                    name: "PORT",
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDRESS",
                reason: e.to_string(),
            })?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                name: "LOG_FORMAT",
                reason,
            })?,
            None => LogFormat::Pretty,
        };

        Ok(Config {
            port,
            bind_address,
            log_format,
        })
    }

    /// `address:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
