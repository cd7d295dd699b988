// Transactional inventory engine: quantity update + audit record as one unit

use crate::api::InventoryEngine;
use crate::config::Config;
use crate::core::errors::ServiceError;
use crate::core::models::TransactionType;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error};

/// Optional guard checks applied when the quantity update matches zero rows
///
/// Both default off, which preserves the legacy behaviour: a zero-row update
/// is not an error and the log insert still proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryGuards {
    /// For sales, refuse to drive the quantity below zero.
    pub enforce_stock_floor: bool,
    /// Refuse stock changes against a product id that does not exist.
    pub require_known_product: bool,
}

impl InventoryGuards {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enforce_stock_floor: config.enforce_stock_floor,
            require_known_product: config.require_known_product,
        }
    }
}

/// Database-backed inventory engine
///
/// Every stock change runs on one dedicated pooled connection inside one
/// storage transaction: the quantity update strictly precedes the log
/// insert, and both commit together or neither does. The transaction value
/// rolls back on drop, so the connection is released on every exit path.
pub struct SqlInventoryEngine {
    pool: SqlitePool,
    guards: InventoryGuards,
}

impl SqlInventoryEngine {
    pub fn new(pool: SqlitePool, guards: InventoryGuards) -> Self {
        Self { pool, guards }
    }

    /// Apply one stock change: update, guard checks, log insert, commit
    async fn apply(
        &self,
        product_id: i64,
        kind: TransactionType,
        quantity: i64,
    ) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let update_sql = match kind {
            TransactionType::Sale if self.guards.enforce_stock_floor => {
                "UPDATE products SET quantity = quantity - ?1 WHERE id = ?2 AND quantity - ?1 >= 0"
            }
            TransactionType::Sale => "UPDATE products SET quantity = quantity - ?1 WHERE id = ?2",
            TransactionType::Purchase => {
                "UPDATE products SET quantity = quantity + ?1 WHERE id = ?2"
            }
        };

        let rows = match sqlx::query(update_sql)
            .bind(quantity)
            .bind(product_id)
            .execute(&mut *tx)
            .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                error!(error = %e, product_id, kind = %kind, "Quantity update failed");
                return Self::rolled_back(tx, e.into()).await;
            }
        };

        if rows == 0 {
            if let Err(guard_error) = self.check_zero_row(&mut tx, product_id, kind).await {
                return Self::rolled_back(tx, guard_error).await;
            }
        }

        let insert = sqlx::query(
            "INSERT INTO transactions (product_id, transaction_type, quantity_changed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(product_id)
        .bind(kind)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            error!(error = %e, product_id, kind = %kind, "Transaction-log insert failed");
            return Self::rolled_back(tx, e.into()).await;
        }

        tx.commit().await.map_err(|e| {
            error!(error = %e, product_id, kind = %kind, "Commit failed");
            ServiceError::StorageFailure(format!("Commit failed: {}", e))
        })?;

        debug!(product_id, kind = %kind, quantity, "Stock change committed");
        Ok(())
    }

    /// Resolve a zero-row update under the configured guards
    ///
    /// With both guards off this is a no-op, keeping the legacy zero-row
    /// semantics. A missing product with only the stock-floor guard on also
    /// keeps the legacy path.
    async fn check_zero_row(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: i64,
        kind: TransactionType,
    ) -> Result<(), ServiceError> {
        let floor_applies = self.guards.enforce_stock_floor && kind == TransactionType::Sale;
        if !self.guards.require_known_product && !floor_applies {
            return Ok(());
        }

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&mut **tx)
            .await?;

        if exists == 0 {
            if self.guards.require_known_product {
                return Err(ServiceError::NotFound("Product".to_string()));
            }
            return Ok(());
        }

        if floor_applies {
            return Err(ServiceError::ValidationFailure(
                "Insufficient stock for sale".to_string(),
            ));
        }

        Ok(())
    }

    /// Explicit rollback that never masks the original failure
    ///
    /// When the rollback itself fails, both errors are surfaced as one
    /// `RollbackFailure` instead of silently swallowing either.
    async fn rolled_back(
        tx: Transaction<'_, Sqlite>,
        original: ServiceError,
    ) -> Result<(), ServiceError> {
        match tx.rollback().await {
            Ok(()) => Err(original),
            Err(rollback_err) => {
                error!(
                    original = %original,
                    rollback = %rollback_err,
                    "Rollback failed after a failed transaction step"
                );
                Err(ServiceError::RollbackFailure {
                    original: original.to_string(),
                    rollback: rollback_err.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl InventoryEngine for SqlInventoryEngine {
    async fn record_sale(&self, product_id: i64, quantity_sold: i64) -> Result<(), ServiceError> {
        self.apply(product_id, TransactionType::Sale, quantity_sold)
            .await
    }

    async fn record_purchase(
        &self,
        product_id: i64,
        quantity_purchased: i64,
    ) -> Result<(), ServiceError> {
        self.apply(product_id, TransactionType::Purchase, quantity_purchased)
            .await
    }
}
