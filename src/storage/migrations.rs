// Schema migrations: versioned, forward-only

use crate::core::errors::ServiceError;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// One forward-only migration step: (version, name, SQL statement)
type Migration = (i64, &'static str, &'static str);

/// Ordered migration list. Append only; never edit an applied entry.
const MIGRATIONS: &[Migration] = &[
    (
        1,
        "create_products",
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0
        )",
    ),
    (
        2,
        "create_transactions",
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id),
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('sale', 'purchase')),
            quantity_changed INTEGER NOT NULL CHECK (quantity_changed > 0),
            created_at TEXT NOT NULL
        )",
    ),
    (
        3,
        "index_transactions_product",
        "CREATE INDEX IF NOT EXISTS idx_transactions_product_id
            ON transactions (product_id)",
    ),
    (
        4,
        "create_users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user'))
        )",
    ),
];

/// Apply all pending migrations
///
/// Each step runs in its own transaction and records its version in
/// `schema_version`; a failed step rolls back when the transaction drops and
/// leaves the recorded version untouched. Re-running is a no-op.
pub async fn run(pool: &SqlitePool) -> Result<(), ServiceError> {
    ensure_version_table(pool).await?;

    let current = current_version(pool).await?;
    let latest = MIGRATIONS.last().map(|(v, _, _)| *v).unwrap_or(0);

    if current >= latest {
        debug!(version = current, "Schema is up to date");
        return Ok(());
    }

    info!(from = current, to = latest, "Applying schema migrations");

    for (version, name, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        debug!(version, name, "Applying migration");

        let mut tx = pool.begin().await?;

        sqlx::query(sql).execute(&mut *tx).await.map_err(|e| {
            ServiceError::StorageFailure(format!("Migration {} ({}) failed: {}", version, name, e))
        })?;

        sqlx::query("INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)")
            .bind(version)
            .bind(name)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ServiceError::StorageFailure(format!(
                    "Failed to record migration {} ({}): {}",
                    version, name, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            ServiceError::StorageFailure(format!(
                "Failed to commit migration {} ({}): {}",
                version, name, e
            ))
        })?;

        info!(version, name, "Migration applied");
    }

    Ok(())
}

/// Highest applied migration version (0 on a fresh database)
pub async fn current_version(pool: &SqlitePool) -> Result<i64, ServiceError> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

async fn ensure_version_table(pool: &SqlitePool) -> Result<(), ServiceError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
