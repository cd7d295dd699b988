// Storage connection provider: pool construction and connectivity probe

pub mod migrations;

use crate::config::Config;
use crate::core::errors::ServiceError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Build the connection pool from configuration
///
/// Created once at startup and injected into every component that needs
/// storage access; business logic never reaches for a global pool.
pub async fn connect(config: &Config) -> Result<SqlitePool, ServiceError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| {
            ServiceError::ConfigError(format!(
                "Invalid DATABASE_URL '{}': {}",
                config.database_url, e
            ))
        })?
        .create_if_missing(true)
        // The schema's REFERENCES clause is declarative only (SPEC_FULL §3.1):
        // sqlx enables the foreign-key pragma by default, which would reject
        // the legacy zero-row log insert, so it is switched off explicitly.
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|e| ServiceError::StorageFailure(format!("Failed to open database: {}", e)))?;

    Ok(pool)
}

/// Connectivity probe run at startup
pub async fn ping(pool: &SqlitePool) -> Result<(), ServiceError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
