//! PostgreSQL configuration

use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// PostgreSQL connection and behavior configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Connection pool configuration
    pub pool: PoolConfig,
    /// Upper bound for committing or rolling back a unit of work
    pub transaction_timeout: Duration,
    /// Create missing tables on startup
    pub ensure_schema: bool,
}

impl PostgresConfig {
    /// Load configuration from environment variables.
    ///
    /// Requires `DATABASE_URL`. Optional overrides:
    /// `DRAINWATCH_DB_MIN_CONNECTIONS`, `DRAINWATCH_DB_MAX_CONNECTIONS`,
    /// `DRAINWATCH_DB_ACQUIRE_TIMEOUT_SECS`, `DRAINWATCH_DB_TX_TIMEOUT_SECS`
    /// and `DRAINWATCH_DB_ENSURE_SCHEMA`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?;
        let mut config = Self::new(database_url).map_err(|e| match e {
            ConfigError::Invalid { reason, .. } => {
                ConfigError::Invalid { key: "DATABASE_URL".to_string(), reason }
            }
            other => other,
        })?;

        if let Some(min) = env_number("DRAINWATCH_DB_MIN_CONNECTIONS")? {
            config.pool.min_connections = min;
        }
        if let Some(max) = env_number("DRAINWATCH_DB_MAX_CONNECTIONS")? {
            config.pool.max_connections = max;
        }
        if let Some(secs) = env_number("DRAINWATCH_DB_ACQUIRE_TIMEOUT_SECS")? {
            config.pool.acquire_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number("DRAINWATCH_DB_TX_TIMEOUT_SECS")? {
            config.transaction_timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = std::env::var("DRAINWATCH_DB_ENSURE_SCHEMA") {
            config.ensure_schema = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Create a new configuration with the given database URL
    pub fn new(database_url: String) -> Result<Self, ConfigError> {
        if database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database_url".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        Ok(Self {
            database_url,
            pool: PoolConfig::default(),
            transaction_timeout: Duration::from_secs(30),
            ensure_schema: true,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(ConfigError::Invalid {
                key: "database_url".to_string(),
                reason: "expected a postgres:// or postgresql:// URL".to_string(),
            });
        }
        if self.transaction_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "transaction_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        self.pool.validate()
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("'{}' is not a non-negative integer", raw),
        }),
        Err(_) => Ok(None),
    }
}

/// Connection pool sizing; a municipal deployment rarely needs more than a handful
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 8,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: String| ConfigError::Invalid { key: key.to_string(), reason };

        if self.max_connections == 0 {
            Err(invalid("pool.max_connections", "must be at least 1".to_string()))
        } else if self.min_connections > self.max_connections {
            Err(invalid(
                "pool.min_connections",
                format!("{} exceeds max_connections {}", self.min_connections, self.max_connections),
            ))
        } else if self.acquire_timeout.is_zero() {
            Err(invalid("pool.acquire_timeout", "must be greater than 0".to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_empty_url() {
        match PostgresConfig::new("  ".to_string()) {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "database_url"),
            other => panic!("Expected Invalid error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PostgresConfig::new("postgresql://localhost/drainwatch".to_string()).unwrap();
        assert!(config.ensure_schema);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_bounds() {
        let mut pool = PoolConfig { min_connections: 20, ..PoolConfig::default() };
        assert!(pool.validate().is_err());
        pool.min_connections = 0;
        pool.max_connections = 0;
        assert!(pool.validate().is_err());
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        let config = PostgresConfig::new("mysql://localhost/drainwatch".to_string()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_transaction_timeout_rejected() {
        let mut config = PostgresConfig::new("postgresql://localhost/drainwatch".to_string()).unwrap();
        config.transaction_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
