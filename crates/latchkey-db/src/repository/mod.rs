//! Database repository implementation

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbError;

// Submodules
mod sessions;
mod users;

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage.
    ///
    /// Host applications use this to add their own extension tables
    /// (e.g. per-user profile rows keyed by `user_id`) without touching
    /// the core schema.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn execute_migration(&self, sql: &str) -> Result<(), DbError> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        // Create tables if they don't exist
        self.execute_migration(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                enabled BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .await?;

        self.execute_migration(
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)
            "#,
        )
        .await?;

        self.execute_migration(
            r#"
            CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                session_id VARCHAR(255) NOT NULL UNIQUE,
                expiration TEXT NOT NULL
            )
            "#,
        )
        .await?;

        self.execute_migration(
            r#"
            CREATE INDEX IF NOT EXISTS idx_auth_sessions_user_id ON auth_sessions(user_id)
            "#,
        )
        .await?;

        self.execute_migration(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_auth_sessions_session_id ON auth_sessions(session_id)
            "#,
        )
        .await?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        let db = Database::new(&url).await.unwrap();
        // Everything is IF NOT EXISTS; a second pass must not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_statement_reports_migration_error() {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        let db = Database::new(&url).await.unwrap();
        let err = db.execute_migration("CREATE BOGUS").await.unwrap_err();
        assert!(matches!(err, DbError::Migration(_)));
    }
}
