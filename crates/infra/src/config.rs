//! Process configuration loaded from environment variables.

use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Postgres connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Timeout for establishing the connection to the accounting engine.
    pub connect_timeout: Duration,
    /// Upper bound on a whole request/response exchange.
    pub read_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let seconds = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match value(key) {
                None => Ok(default),
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidSeconds { key, value: raw }),
            }
        };

        Ok(Self {
            database_url: value("DATABASE_URL"),
            bind_addr: value("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            connect_timeout: seconds("ACCOUNTING_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?,
            read_timeout: seconds("ACCOUNTING_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT)?,
        })
    }
}
