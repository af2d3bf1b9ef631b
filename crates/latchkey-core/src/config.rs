//! Authentication configuration

use chrono::Duration;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
/// Default interval before a memoized identity is re-resolved
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: i64 = 10;
/// Default bound on deferred redirects while waiting for hydration
pub const DEFAULT_MAX_HYDRATION_DEFERS: u32 = 20;

/// Route surface for the authentication pages.
///
/// Hosts override these before page registration; the struct is then
/// threaded through the guard, controllers, and page registration so
/// there is no global mutable route state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRoutes {
    pub login: String,
    pub register: String,
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            register: "/register".to_string(),
        }
    }
}

/// Configuration for the auth session manager and route guard.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub routes: AuthRoutes,
    /// Lifetime of a session created by login
    pub session_ttl: Duration,
    /// How long a resolved identity stays memoized before re-resolution
    pub refresh_interval: Duration,
    /// How many times a redirect may defer waiting for client hydration
    pub max_hydration_defers: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            routes: AuthRoutes::default(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            refresh_interval: Duration::minutes(DEFAULT_REFRESH_INTERVAL_MINUTES),
            max_hydration_defers: DEFAULT_MAX_HYDRATION_DEFERS,
        }
    }
}
