//! Login controller

use tracing::{debug, info};

use crate::error::AuthError;
use crate::password::{verify_password, DUMMY_HASH};
use crate::session::AuthSession;

/// Shared failure message for unknown usernames and wrong passwords, so
/// error text does not reveal whether an account exists.
pub const GENERIC_LOGIN_ERROR: &str = "There was a problem logging in, please try again.";

/// Failure message for disabled accounts.
///
/// Note: this message is distinct from [`GENERIC_LOGIN_ERROR`], so the
/// disabled branch discloses that the account exists. Known product
/// behavior; do not change without sign-off.
pub const DISABLED_ACCOUNT_ERROR: &str = "This account is disabled.";

/// Outcome of a login form submission.
///
/// Every failure requires the transport to clear the password field; a
/// submitted password is never re-rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure,
}

/// Handles login form submission and the post-login redirect target.
///
/// Composes the request-scoped [`AuthSession`] rather than extending it;
/// the transient fields live only for the request.
#[derive(Debug, Default)]
pub struct LoginController {
    pub error_message: String,
    pub redirect_to: Option<String>,
}

impl LoginController {
    pub fn new(redirect_to: Option<String>) -> Self {
        Self {
            error_message: String::new(),
            redirect_to: redirect_to.filter(|r| !r.is_empty()),
        }
    }

    /// Handle a login form submission.
    ///
    /// On success the auth session holds a fresh session row for the
    /// client token. On failure `error_message` carries the user-facing
    /// reason. Store errors are fatal and propagate.
    pub async fn on_submit(
        &mut self,
        auth: &mut AuthSession,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        self.error_message.clear();
        debug!(username, "Login attempt");

        let user = auth.database().get_user_by_username(username).await?;

        if let Some(user) = &user {
            if !user.enabled {
                self.error_message = DISABLED_ACCOUNT_ERROR.to_string();
                return Ok(LoginOutcome::Failure);
            }
        }

        // Verify against a dummy hash when the user is unknown, so the
        // unknown-user and wrong-password paths take comparable time.
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = !password.is_empty() && verify_password(password, hash)?;

        match (user, password_valid) {
            (Some(user), true) => {
                auth.login(user.id).await?;
                info!(username, "Login succeeded");
                Ok(LoginOutcome::Success)
            }
            _ => {
                self.error_message = GENERIC_LOGIN_ERROR.to_string();
                Ok(LoginOutcome::Failure)
            }
        }
    }
}
