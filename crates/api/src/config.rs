//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SOLARWORKS_BIND` - listen address (default: 0.0.0.0:8080)
//! - `DATABASE_URL` - PostgreSQL connection string; the in-memory store is used when unset
//! - `SOLARWORKS_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `SOLARWORKS_LOG_FORMAT` - `json` or `pretty` (default: json)
//!
//! A `.env` file in the working directory is loaded first when present.

use std::net::SocketAddr;

use thiserror::Error;

use solarworks_observability::LogFormat;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub database: Option<DatabaseConfig>,
    pub log_format: LogFormat,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

// The URL carries the password.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for AppConfig {
    /// In-memory store on the default address.
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("SOLARWORKS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SOLARWORKS_BIND".into(), e.to_string()))?;

        let log_format = match get("SOLARWORKS_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| {
                ConfigError::InvalidEnvVar("SOLARWORKS_LOG_FORMAT".into(), e.to_string())
            })?,
            None => LogFormat::default(),
        };

        let max_connections = match get("SOLARWORKS_DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnvVar(
                        "SOLARWORKS_DB_MAX_CONNECTIONS".into(),
                        format!("expected a positive integer, got '{raw}'"),
                    ));
                }
            },
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let database = get("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections,
        });

        Ok(Self {
            bind,
            database,
            log_format,
        })
    }
}
