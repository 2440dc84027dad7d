//! User repository: persistence and queries for user records.
//!
//! External: SQLite via sqlx; callers use the [`Repository`] methods plus `count`.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::repository::Repository;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating users table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                is_admin INTEGER NOT NULL DEFAULT 0,
                subscription_expires_at TEXT,
                referred_by INTEGER,
                referral_count INTEGER NOT NULL DEFAULT 0,
                joined_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(total.0)
    }
}

#[async_trait]
impl Repository<UserRecord> for UserRepository {
    async fn save(&self, user: &UserRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, is_admin, subscription_expires_at, referred_by, referral_count, joined_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                is_admin = excluded.is_admin,
                subscription_expires_at = excluded.subscription_expires_at,
                referred_by = excluded.referred_by,
                referral_count = excluded.referral_count,
                joined_at = excluded.joined_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(user.is_admin)
        .bind(user.subscription_expires_at)
        .bind(user.referred_by)
        .bind(user.referral_count)
        .bind(user.joined_at)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(user_id = user.id, "Saved user");
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<UserRecord>, StorageError> {
        let users = sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY joined_at ASC, id ASC")
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(users)
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
