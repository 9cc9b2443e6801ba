//! PostgreSQL storage adapter implementation

mod catalog;
pub mod config;
mod rows;
mod schema;
mod transaction;

pub use config::{ConfigError, PoolConfig, PostgresConfig};
pub use transaction::PgUnitOfWork;

use drainwatch_core::error::{DrainError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// PostgreSQL storage adapter
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresStore {
    /// Connect with the given configuration, creating missing tables if enabled
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| DrainError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| rows::db_error("Failed to connect to database", e))?;

        let store = Self { pool, config };
        store.health_check().await?;
        if store.config.ensure_schema {
            store.ensure_schema().await?;
        }

        tracing::info!(
            max_connections = store.config.pool.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(store)
    }

    /// Create any missing tables and indexes
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in schema::SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| rows::db_error("Failed to create schema", e))?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| rows::db_error("Health check failed", e))?;
        Ok(())
    }
}
