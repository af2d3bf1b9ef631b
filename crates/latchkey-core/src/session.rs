//! Request-scoped auth session manager
//!
//! Each client interaction builds one `AuthSession` from the database
//! handle, the shared configuration, and the client-held token. The
//! resolved identity is memoized with the time it was computed and
//! re-resolved once the refresh interval elapses or after an explicit
//! invalidation on login/logout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use latchkey_db::{Database, NewAuthSession};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::Identity;

/// A resolved identity plus the time it was computed.
#[derive(Debug, Clone)]
struct ResolvedIdentity {
    identity: Identity,
    resolved_at: DateTime<Utc>,
}

/// Request-scoped authentication state.
pub struct AuthSession {
    db: Database,
    config: Arc<AuthConfig>,
    token: Option<String>,
    token_touched: bool,
    resolved: Option<ResolvedIdentity>,
}

impl AuthSession {
    /// Build a session from the client-held token, if any.
    ///
    /// An empty token string is normalized to "no token".
    pub fn new(db: Database, config: Arc<AuthConfig>, token: Option<String>) -> Self {
        Self {
            db,
            config,
            token: token.filter(|t| !t.is_empty()),
            token_touched: false,
            resolved: None,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The durable token for this session, if one is established.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether login/logout changed the token's client-side storage.
    ///
    /// The transport layer must re-write the client storage (cookie or
    /// equivalent) when this is set, so the client observes the change
    /// even when the token value itself is unchanged.
    pub fn token_touched(&self) -> bool {
        self.token_touched
    }

    /// Resolve the token to an identity, memoized per refresh interval.
    ///
    /// An absent token resolves to `Identity::Anonymous` without a store
    /// query. A store miss (including an expired session) also resolves
    /// to `Anonymous`; store errors are fatal to the request.
    pub async fn resolve(&mut self) -> Result<Identity, AuthError> {
        let now = Utc::now();
        let stale = self
            .resolved
            .as_ref()
            .map(|memo| now - memo.resolved_at > self.config.refresh_interval)
            .unwrap_or(true);

        if stale {
            let identity = match &self.token {
                None => Identity::Anonymous,
                Some(token) => match self.db.find_active_session(token, now).await? {
                    Some((user, _session)) => Identity::User(user),
                    None => Identity::Anonymous,
                },
            };
            debug!(
                authenticated = identity.is_authenticated(),
                "Resolved auth session"
            );
            self.resolved = Some(ResolvedIdentity {
                identity,
                resolved_at: now,
            });
        }

        let memo = self.resolved.get_or_insert_with(|| ResolvedIdentity {
            identity: Identity::Anonymous,
            resolved_at: now,
        });
        Ok(memo.identity.clone())
    }

    pub async fn is_authenticated(&mut self) -> Result<bool, AuthError> {
        Ok(self.resolve().await?.is_authenticated())
    }

    pub async fn authenticated_user(&mut self) -> Result<Option<latchkey_db::LocalUser>, AuthError> {
        Ok(match self.resolve().await? {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        })
    }

    /// Drop the memoized identity so the next access re-resolves.
    pub fn invalidate(&mut self) {
        self.resolved = None;
    }

    /// Create a session for `user_id` with the default TTL.
    pub async fn login(&mut self, user_id: i64) -> Result<(), AuthError> {
        let ttl = self.config.session_ttl;
        self.login_with_ttl(user_id, ttl).await
    }

    /// Create a session for `user_id` with an explicit TTL.
    ///
    /// Any prior session for this token is logged out first, so a token
    /// never accumulates session rows. A negative `user_id` is the raw-id
    /// sentinel for "no user" and creates nothing. When the client
    /// supplied no token, a fresh random one is minted and becomes the
    /// durable token once the transport persists it client-side.
    pub async fn login_with_ttl(&mut self, user_id: i64, ttl: Duration) -> Result<(), AuthError> {
        self.logout().await?;
        if user_id < 0 {
            return Ok(());
        }

        let token = match &self.token {
            Some(token) => token.clone(),
            None => {
                let minted = uuid::Uuid::new_v4().to_string();
                self.token = Some(minted.clone());
                minted
            }
        };

        self.db
            .create_session(NewAuthSession {
                user_id,
                session_id: token,
                expiration: Utc::now() + ttl,
            })
            .await?;
        self.token_touched = true;
        self.invalidate();

        info!(user_id, "User logged in");
        Ok(())
    }

    /// Destroy every session row for the current token.
    ///
    /// Always touches the token so the transport re-writes client
    /// storage; beyond that, calling on an already-logged-out token is a
    /// no-op.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(token) = &self.token {
            let removed = self.db.delete_sessions_for_token(token).await?;
            if removed > 0 {
                info!(removed, "Destroyed auth sessions for token");
            }
        }
        self.token_touched = true;
        self.invalidate();
        Ok(())
    }
}
