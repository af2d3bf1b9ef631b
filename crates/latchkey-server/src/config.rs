//! Configuration loading and management

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use latchkey_core::{
    AuthConfig, AuthRoutes, DEFAULT_MAX_HYDRATION_DEFERS, DEFAULT_REFRESH_INTERVAL_MINUTES,
    DEFAULT_SESSION_TTL_DAYS,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_register_route")]
    pub register_route: String,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    #[serde(default = "default_refresh_interval_minutes")]
    pub refresh_interval_minutes: i64,
    #[serde(default = "default_max_hydration_defers")]
    pub max_hydration_defers: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "data/latchkey.db".to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_register_route() -> String {
    "/register".to_string()
}

fn default_session_ttl_days() -> i64 {
    DEFAULT_SESSION_TTL_DAYS
}

fn default_refresh_interval_minutes() -> i64 {
    DEFAULT_REFRESH_INTERVAL_MINUTES
}

fn default_max_hydration_defers() -> u32 {
    DEFAULT_MAX_HYDRATION_DEFERS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_route: default_login_route(),
            register_route: default_register_route(),
            session_ttl_days: default_session_ttl_days(),
            refresh_interval_minutes: default_refresh_interval_minutes(),
            max_hydration_defers: default_max_hydration_defers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults
    /// when the file does not exist.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            warn!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {path}"))
    }

    /// Build the core auth configuration threaded through the guard,
    /// controllers, and page registration.
    pub fn auth_config(&self) -> Arc<AuthConfig> {
        Arc::new(AuthConfig {
            routes: AuthRoutes {
                login: self.auth.login_route.clone(),
                register: self.auth.register_route.clone(),
            },
            session_ttl: chrono::Duration::days(self.auth.session_ttl_days),
            refresh_interval: chrono::Duration::minutes(self.auth.refresh_interval_minutes),
            max_hydration_defers: self.auth.max_hydration_defers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.login_route, "/login");
        assert_eq!(config.auth.session_ttl_days, 7);
        assert_eq!(config.auth.refresh_interval_minutes, 10);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            login_route = "/signin"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.login_route, "/signin");
        assert_eq!(config.auth.register_route, "/register");
        assert_eq!(config.server.bind_address, "0.0.0.0");

        let auth = config.auth_config();
        assert_eq!(auth.routes.login, "/signin");
        assert_eq!(auth.session_ttl, chrono::Duration::days(7));
    }
}
