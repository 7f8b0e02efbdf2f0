//! Service configuration.
//!
//! Configuration is loaded from `FULFIL_*` environment variables with
//! fallback to defaults.
//!
//! | Variable                 | Default     |
//! |--------------------------|-------------|
//! | `FULFIL_DATABASE_PATH`   | `fulfil.db` |
//! | `FULFIL_MAX_CONNECTIONS` | `5`         |
//! | `FULFIL_BUSY_TIMEOUT_MS` | `5000`      |
//! | `FULFIL_TX_TIMEOUT_MS`   | `5000`      |
//! | `FULFIL_STATUS_POLICY`   | `strict`    |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use fulfil_core::TransitionPolicy;
use fulfil_db::DbConfig;

/// Fulfilment service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a statement waits for another writer's lock
    pub busy_timeout: Duration,

    /// Upper bound on one checkout transaction
    pub tx_timeout: Duration,

    /// Which order status changes are accepted
    pub status_policy: TransitionPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("fulfil.db"),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
            tx_timeout: Duration::from_millis(5000),
            status_policy: TransitionPolicy::Strict,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. `load` passes the process
    /// environment.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            database_path: lookup("FULFIL_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: lookup("FULFIL_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FULFIL_MAX_CONNECTIONS".to_string()))?,

            busy_timeout: Duration::from_millis(
                lookup("FULFIL_BUSY_TIMEOUT_MS")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("FULFIL_BUSY_TIMEOUT_MS".to_string()))?,
            ),

            tx_timeout: Duration::from_millis(
                lookup("FULFIL_TX_TIMEOUT_MS")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("FULFIL_TX_TIMEOUT_MS".to_string()))?,
            ),

            status_policy: lookup("FULFIL_STATUS_POLICY")
                .unwrap_or_else(|| "strict".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FULFIL_STATUS_POLICY".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "FULFIL_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.tx_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("FULFIL_TX_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(self.busy_timeout)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
