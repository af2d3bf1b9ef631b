//! Auth session operations

use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::error::DbError;
use crate::models::{AuthSessionRecord, LocalUser, NewAuthSession};

use super::Database;

impl Database {
    /// Create a new auth session.
    ///
    /// The store does not deduplicate: the caller must have deleted any
    /// prior session for the same token first. The unique index on
    /// `session_id` rejects the loser of a concurrent delete/insert race.
    pub async fn create_session(
        &self,
        session: NewAuthSession,
    ) -> Result<AuthSessionRecord, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO auth_sessions (user_id, session_id, expiration)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(session.user_id)
        .bind(&session.session_id)
        .bind(session.expiration.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Duplicate(format!(
                "Session already exists for token '{}'",
                session.session_id
            )),
            _ => DbError::from(e),
        })?;

        let id: i64 = result.get("id");

        Ok(AuthSessionRecord {
            id,
            user_id: session.user_id,
            session_id: session.session_id,
            expiration: session.expiration,
        })
    }

    /// Find the active session for a token, joined with its user.
    ///
    /// Expired rows are treated as absent (lazy expiration); they are
    /// never returned even while still stored. Ordering by primary key
    /// makes a hypothetical multi-match resolve deterministically.
    pub async fn find_active_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(LocalUser, AuthSessionRecord)>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT u.id, u.username, u.password_hash, u.enabled,
                   s.id AS session_pk, s.user_id, s.session_id, s.expiration
            FROM auth_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_id = ? AND s.expiration >= ?
            ORDER BY s.id
            LIMIT 1
            "#,
        )
        .bind(token)
        .bind(now.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| {
                let user = LocalUser::try_from(&row)?;
                let session = AuthSessionRecord {
                    id: row.try_get("session_pk")?,
                    user_id: row.try_get("user_id")?,
                    session_id: row.try_get("session_id")?,
                    expiration: crate::utils::parse_datetime_or_now(
                        &row.try_get::<String, _>("expiration")?,
                    ),
                };
                Ok((user, session))
            })
            .transpose()
            .map_err(DbError::Connection)
    }

    /// Delete every session row for a token (defensive cleanup of
    /// stale/duplicate rows). Returns the number of rows removed.
    pub async fn delete_sessions_for_token(&self, token: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE session_id = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all session rows for a token, including expired ones.
    pub async fn count_sessions_for_token(&self, token: &str) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM auth_sessions WHERE session_id = ?")
            .bind(token)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLocalUser;
    use chrono::Duration;

    async fn test_db() -> Database {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        Database::new(&url).await.unwrap()
    }

    async fn seed_user(db: &Database, username: &str) -> LocalUser {
        db.insert_user(NewLocalUser {
            username: username.to_string(),
            password_hash: "$argon2id$fake$hash".to_string(),
            enabled: true,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_active_session() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let now = Utc::now();

        let session = db
            .create_session(NewAuthSession {
                user_id: user.id,
                session_id: "tok-1".to_string(),
                expiration: now + Duration::days(7),
            })
            .await
            .unwrap();
        assert!(session.id > 0);

        let (found_user, found_session) = db
            .find_active_session("tok-1", now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found_user.id, user.id);
        assert_eq!(found_session.session_id, "tok-1");

        assert!(db.find_active_session("tok-2", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_never_returned() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let now = Utc::now();

        db.create_session(NewAuthSession {
            user_id: user.id,
            session_id: "tok-1".to_string(),
            expiration: now - Duration::seconds(1),
        })
        .await
        .unwrap();

        // Row is still stored but find_active treats it as absent
        assert_eq!(db.count_sessions_for_token("tok-1").await.unwrap(), 1);
        assert!(db.find_active_session("tok-1", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected_by_store() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let now = Utc::now();

        let session = NewAuthSession {
            user_id: user.id,
            session_id: "tok-1".to_string(),
            expiration: now + Duration::days(7),
        };
        db.create_session(session.clone()).await.unwrap();
        let err = db.create_session(session).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_delete_sessions_for_token() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let now = Utc::now();

        db.create_session(NewAuthSession {
            user_id: user.id,
            session_id: "tok-1".to_string(),
            expiration: now + Duration::days(7),
        })
        .await
        .unwrap();

        assert_eq!(db.delete_sessions_for_token("tok-1").await.unwrap(), 1);
        assert_eq!(db.count_sessions_for_token("tok-1").await.unwrap(), 0);
        // Idempotent on an already-clean token
        assert_eq!(db.delete_sessions_for_token("tok-1").await.unwrap(), 0);
    }
}
