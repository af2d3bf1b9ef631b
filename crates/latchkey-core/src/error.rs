//! Core authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Store(#[from] latchkey_db::DbError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Client hydration did not complete")]
    HydrationTimeout,
}
