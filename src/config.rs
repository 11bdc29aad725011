use crate::{AnalyticsError, Result};
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "timeseries_analytics=info";
pub const DEFAULT_MAX_SERIES_LENGTH: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    pub default_seed: Option<u64>,
    pub max_series_length: usize,
}

impl ServiceConfig {
    /// Reads `ANALYTICS_BIND_ADDR`, `ANALYTICS_LOG`, `ANALYTICS_DEFAULT_SEED` and
    /// `ANALYTICS_MAX_SERIES_LENGTH`, falling back to defaults when unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("ANALYTICS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AnalyticsError::Configuration(format!("ANALYTICS_BIND_ADDR: {}", e)))?;

        let log_filter = lookup("ANALYTICS_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let default_seed = lookup("ANALYTICS_DEFAULT_SEED")
            .map(|seed| {
                seed.parse::<u64>()
                    .map_err(|e| AnalyticsError::Configuration(format!("ANALYTICS_DEFAULT_SEED: {}", e)))
            })
            .transpose()?;

        let max_series_length = match lookup("ANALYTICS_MAX_SERIES_LENGTH") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|e| AnalyticsError::Configuration(format!("ANALYTICS_MAX_SERIES_LENGTH: {}", e)))?,
            None => DEFAULT_MAX_SERIES_LENGTH,
        };

        Ok(Self {
            bind_addr,
            log_filter,
            default_seed,
            max_series_length,
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_seed: None,
            max_series_length: DEFAULT_MAX_SERIES_LENGTH,
        }
    }
}
