// Product repository: plain CRUD against the products table

use crate::api::ProductStore;
use crate::core::errors::ServiceError;
use crate::core::models::Product;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Database-backed product repository
///
/// Each operation is a single non-transactional statement on the injected
/// pool; cross-row invariants live in the inventory engine, not here.
pub struct DbProductStore {
    pool: SqlitePool,
}

impl DbProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for DbProductStore {
    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let products = sqlx::query_as::<_, Product>("SELECT id, name, quantity FROM products")
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn create(&self, name: &str, quantity: i64) -> Result<i64, ServiceError> {
        let result = sqlx::query("INSERT INTO products (name, quantity) VALUES (?1, ?2)")
            .bind(name)
            .bind(quantity)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, name: &str, quantity: i64) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE products SET name = ?1, quantity = ?2 WHERE id = ?3")
            .bind(name)
            .bind(quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
