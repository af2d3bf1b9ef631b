//! Web error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Auth error: {0}")]
    Auth(#[from] latchkey_core::AuthError),

    #[error("Database error: {0}")]
    Database(#[from] latchkey_db::DbError),

    /// Guard rejection: the request must authenticate first. Carries
    /// the full login path including the remembered origin.
    #[error("Login required")]
    LoginRequired(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::LoginRequired(login_path) => Redirect::to(login_path).into_response(),
            WebError::Auth(latchkey_core::AuthError::HydrationTimeout) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication state could not be established",
            )
                .into_response(),
            // Store failures are fatal to the request; recovery is an
            // infrastructure concern outside this component.
            WebError::Auth(_) | WebError::Database(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
