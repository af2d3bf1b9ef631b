//! Latchkey Core Authentication Logic
//!
//! This crate provides the core of latchkey: credential hashing, the
//! request-scoped auth session manager, login/registration controllers,
//! and the redirect decision procedure for protected routes.

pub mod config;
pub mod error;
pub mod identity;
pub mod login;
pub mod password;
pub mod redirect;
pub mod registration;
pub mod session;

pub use config::{
    AuthConfig, AuthRoutes, DEFAULT_MAX_HYDRATION_DEFERS, DEFAULT_REFRESH_INTERVAL_MINUTES,
    DEFAULT_SESSION_TTL_DAYS,
};
pub use error::AuthError;
pub use identity::Identity;
pub use login::{LoginController, LoginOutcome};
pub use password::{hash_password, verify_password};
pub use redirect::{RedirectContext, RedirectDecision, redir};
pub use registration::{RegistrationController, RegistrationOutcome};
pub use session::AuthSession;
