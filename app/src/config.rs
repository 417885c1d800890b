//! Configuration loaded from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `TASKNEST_COLLECTION` | `tasks` |
//! | `RUST_LOG` | `info` |
//! | `TASKNEST_SHUTDOWN_TIMEOUT_SECS` | `5` |
//! | `TASKNEST_BROADCAST_CAPACITY` | `16` |

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tasknest_runtime::StoreConfig;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document collection holding the tasks
    pub collection: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// How long to wait for in-flight remote calls on exit, in seconds
    pub shutdown_timeout_secs: u64,
    /// Capacity of the store's action broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collection: "tasks".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_secs: 5,
            broadcast_capacity: 16,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidConfig`] if a numeric variable does not
    /// parse.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidConfig`] if a numeric variable does not
    /// parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };

        Ok(Self {
            collection: text("TASKNEST_COLLECTION", defaults.collection),
            log_level: text("RUST_LOG", defaults.log_level),
            shutdown_timeout_secs: parse(
                &lookup,
                "TASKNEST_SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout_secs,
            )?,
            broadcast_capacity: parse(
                &lookup,
                "TASKNEST_BROADCAST_CAPACITY",
                defaults.broadcast_capacity,
            )?,
        })
    }

    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Runtime settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_shutdown_timeout(self.shutdown_timeout())
    }
}

fn parse<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| AppError::InvalidConfig {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
