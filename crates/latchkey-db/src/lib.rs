//! Latchkey Database Layer
//!
//! This crate provides the persistence layer for latchkey,
//! using SQLite via sqlx for user and session storage.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
