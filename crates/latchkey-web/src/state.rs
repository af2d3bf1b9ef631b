//! Application state

use std::sync::Arc;

use latchkey_core::AuthConfig;
use latchkey_db::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: Database, auth: Arc<AuthConfig>) -> Self {
        Self { db, auth }
    }
}
