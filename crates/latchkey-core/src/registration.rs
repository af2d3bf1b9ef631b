//! New user registration validation and persistence

use std::time::Duration;

use tracing::info;

use latchkey_db::{Database, NewLocalUser};

use crate::error::AuthError;
use crate::password::hash_password;

/// Delay before the post-registration redirect, long enough for the
/// success notice to be seen. A cooperative sleep, never a thread block.
pub const POST_REGISTRATION_DELAY: Duration = Duration::from_millis(500);

/// Outcome of a registration form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A user row was created with this id.
    Created(i64),
    /// Validation failed; `error_message` carries the reason and no row
    /// was created.
    Invalid,
}

/// Handles registration form submission and the post-registration
/// redirect to the login page.
#[derive(Debug, Default)]
pub struct RegistrationController {
    pub success: bool,
    pub error_message: String,
    /// The id of the user created by the last submission. Hosts use
    /// this to attach extension rows (profile data) keyed by user id.
    pub new_user_id: Option<i64>,
}

impl RegistrationController {
    async fn validate_fields(
        &mut self,
        db: &Database,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<bool, AuthError> {
        if username.is_empty() {
            self.error_message = "Username cannot be empty".to_string();
            return Ok(false);
        }
        if db.get_user_by_username(username).await?.is_some() {
            self.error_message =
                format!("Username {username} is already registered. Try a different name");
            return Ok(false);
        }
        if password.is_empty() {
            self.error_message = "Password cannot be empty".to_string();
            return Ok(false);
        }
        if password != confirm_password {
            self.error_message = "Passwords do not match".to_string();
            return Ok(false);
        }
        Ok(true)
    }

    /// Handle a registration form submission.
    ///
    /// Validation failures set `error_message` and create no row. On
    /// success the new user is persisted enabled, and `new_user_id` is
    /// recorded for extension tables.
    pub async fn handle_registration(
        &mut self,
        db: &Database,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<RegistrationOutcome, AuthError> {
        self.error_message.clear();

        if !self
            .validate_fields(db, username, password, confirm_password)
            .await?
        {
            self.new_user_id = None;
            return Ok(RegistrationOutcome::Invalid);
        }

        let user = db
            .insert_user(NewLocalUser {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                enabled: true,
            })
            .await?;
        self.new_user_id = Some(user.id);

        info!(username, user_id = user.id, "Registered new user");
        Ok(RegistrationOutcome::Created(user.id))
    }

    /// Mark the registration successful and wait out the redirect delay.
    ///
    /// The transport redirects to the login route after this returns.
    pub async fn successful_registration(&mut self) {
        self.error_message.clear();
        self.new_user_id = None;
        self.success = true;
        tokio::time::sleep(POST_REGISTRATION_DELAY).await;
        self.success = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    async fn test_db() -> Database {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        Database::new(&url).await.unwrap()
    }

    async fn user_count(db: &Database) -> i64 {
        sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(db.pool())
            .await
            .map(|row| row.get("count"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_registration_creates_enabled_user() {
        let db = test_db().await;
        let mut controller = RegistrationController::default();

        let outcome = controller
            .handle_registration(&db, "alice", "secret123", "secret123")
            .await
            .unwrap();

        let RegistrationOutcome::Created(id) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(controller.new_user_id, Some(id));
        assert!(controller.error_message.is_empty());

        let user = db.get_user_by_username("alice").await.unwrap().unwrap();
        assert!(user.enabled);
        assert!(crate::password::verify_password("secret123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_empty_username_rejected() {
        let db = test_db().await;
        let mut controller = RegistrationController::default();

        let outcome = controller
            .handle_registration(&db, "", "secret123", "secret123")
            .await
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::Invalid);
        assert_eq!(controller.error_message, "Username cannot be empty");
        assert_eq!(controller.new_user_id, None);
        assert_eq!(user_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        let mut controller = RegistrationController::default();
        controller
            .handle_registration(&db, "alice", "secret123", "secret123")
            .await
            .unwrap();

        let outcome = controller
            .handle_registration(&db, "alice", "other456", "other456")
            .await
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::Invalid);
        assert_eq!(
            controller.error_message,
            "Username alice is already registered. Try a different name"
        );
        assert_eq!(controller.new_user_id, None);
        assert_eq!(user_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let db = test_db().await;
        let mut controller = RegistrationController::default();

        let outcome = controller
            .handle_registration(&db, "alice", "", "")
            .await
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::Invalid);
        assert_eq!(controller.error_message, "Password cannot be empty");
        assert_eq!(user_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_rejected() {
        let db = test_db().await;
        let mut controller = RegistrationController::default();

        let outcome = controller
            .handle_registration(&db, "alice", "secret123", "secret124")
            .await
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::Invalid);
        assert_eq!(controller.error_message, "Passwords do not match");
        assert_eq!(user_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_successful_registration_resets_state() {
        let mut controller = RegistrationController {
            success: false,
            error_message: "stale".to_string(),
            new_user_id: Some(1),
        };

        tokio::time::pause();
        controller.successful_registration().await;

        assert!(!controller.success);
        assert!(controller.error_message.is_empty());
        assert_eq!(controller.new_user_id, None);
    }
}
