// User lookup and startup seeding

use crate::api::UserStore;
use crate::auth::password::hash_password;
use crate::core::errors::ServiceError;
use crate::core::models::{Role, User};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// Database-backed user store
///
/// Read-only from the service's perspective; rows are written only by the
/// startup seeder and test fixtures.
pub struct DbUserStore {
    pool: SqlitePool,
}

impl DbUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for DbUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// Seed an admin account at startup when configured and absent
///
/// Returns true when a row was created. An existing row under the same
/// username is left untouched, whatever its role.
pub async fn seed_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, ServiceError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        debug!(username, "Admin user already present, skipping seed");
        return Ok(false);
    }

    sqlx::query("INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)")
        .bind(username)
        .bind(hash_password(password))
        .bind(Role::Admin)
        .execute(pool)
        .await?;

    Ok(true)
}
