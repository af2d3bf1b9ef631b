//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Local user account model.
///
/// The password hash is an opaque PHC string and is never serialized
/// into any external-facing representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalUser {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub enabled: bool,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
}

/// Correlates a session token with a user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub session_id: String,
    pub expiration: DateTime<Utc>,
}

/// New auth session (for insertion)
#[derive(Debug, Clone)]
pub struct NewAuthSession {
    pub user_id: i64,
    pub session_id: String,
    pub expiration: DateTime<Utc>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for LocalUser {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(LocalUser {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            enabled: row.try_get("enabled")?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for AuthSessionRecord {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(AuthSessionRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            session_id: row.try_get("session_id")?,
            expiration: parse_datetime_or_now(&row.try_get::<String, _>("expiration")?),
        })
    }
}
