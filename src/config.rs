//! Configuration management for the Loggly adapter

use crate::errors::{AdapterError, Result};
use std::env;
use std::time::Duration;

/// Environment variable holding the Loggly customer token
pub const TOKEN_ENV_VAR: &str = "LOGGLY_TOKEN";

/// Environment variable overriding the collector base address
pub const ADDR_ENV_VAR: &str = "LOGGLY_ADDR";

/// Environment variable holding the per-request timeout in seconds
pub const HTTP_TIMEOUT_ENV_VAR: &str = "HTTP_TIMEOUT_SECONDS";

/// Environment variable identifying the host instance, read once per message
pub const INSTANCE_ID_ENV_VAR: &str = "INSTANCE_ID";

pub const DEFAULT_COLLECTOR_ADDR: &str = "https://logs-01.loggly.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Loggly customer token, appended to the ingestion path
    pub token: String,

    /// Collector base address without a trailing slash
    pub collector_addr: String,

    /// Per-request timeout; `None` leaves the client default in place
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV_VAR).unwrap_or_default();

        let collector_addr = lookup(ADDR_ENV_VAR)
            .filter(|addr| !addr.trim().is_empty())
            .map(|addr| addr.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_COLLECTOR_ADDR.to_string());

        let http_timeout = lookup(HTTP_TIMEOUT_ENV_VAR)
            .and_then(|timeout| timeout.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let config = Config {
            token,
            collector_addr,
            http_timeout,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(AdapterError::Config(format!(
                "Could not find environment variable {}",
                TOKEN_ENV_VAR
            )));
        }

        if self.collector_addr.is_empty() {
            return Err(AdapterError::Config(
                "collector address cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Current value of `INSTANCE_ID`, if set and non-empty
pub fn instance_id() -> Option<String> {
    env::var(INSTANCE_ID_ENV_VAR)
        .ok()
        .filter(|id| !id.is_empty())
}
