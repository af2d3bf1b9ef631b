//! Latchkey Web Integration
//!
//! This crate provides the Axum-facing surface of latchkey: token
//! transport over cookies, extractors for the auth session and the
//! route guard, the login/registration/logout handlers, and the page
//! registration hook.

pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod pages;
pub mod state;

pub use error::WebError;
pub use extract::{client_token, ClientSession, AUTH_TOKEN_COOKIE_NAME};
pub use guard::RequireLogin;
pub use handlers::add_routes;
pub use state::AppState;
