//! User operations

use sqlx::Row;

use crate::error::DbError;
use crate::models::{LocalUser, NewLocalUser};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewLocalUser) -> Result<LocalUser, DbError> {
        // Check if user already exists
        let existing = self.get_user_by_username(&user.username).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, enabled)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Backstop for a concurrent insert racing past the pre-check;
            // the unique index on username still holds the invariant.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("User '{}' already exists", user.username))
            }
            _ => DbError::from(e),
        })?;

        let id: i64 = result.get("id");

        Ok(LocalUser {
            id,
            username: user.username,
            password_hash: user.password_hash,
            enabled: user.enabled,
        })
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<LocalUser>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, password_hash, enabled
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| LocalUser::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<LocalUser>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, password_hash, enabled
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| LocalUser::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Enable or disable a user account.
    ///
    /// This is the hook for external administrative tooling; the core
    /// never toggles the flag itself. Returns whether a row changed.
    pub async fn set_user_enabled(&self, id: i64, enabled: bool) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET enabled = ?
            WHERE id = ?
            "#,
        )
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}
