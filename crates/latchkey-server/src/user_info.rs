//! Extension-by-composition demo: per-user profile rows
//!
//! Demonstrates attaching extra attributes (email, registration IP) to
//! accounts without modifying the core schema. The extension table is
//! keyed by `user_id` and built directly on the database pool; the
//! custom registration handler wraps the core controller and inserts
//! the profile row only after the core created the user.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use tracing::info;

use latchkey_core::{RegistrationController, RegistrationOutcome};
use latchkey_web::{AppState, RequireLogin, WebError};

/// Profile attributes attached to a user by this host application.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub email: String,
    pub created_from_ip: String,
    pub user_id: i64,
}

/// Create the extension table. Runs after the core migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            created_from_ip TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn insert_user_info(pool: &SqlitePool, info: &UserInfo) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO user_info (email, created_from_ip, user_id) VALUES (?, ?, ?)")
        .bind(&info.email)
        .bind(&info.created_from_ip)
        .bind(info.user_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn get_user_info(pool: &SqlitePool, user_id: i64) -> Result<Option<UserInfo>, sqlx::Error> {
    let row = sqlx::query("SELECT email, created_from_ip, user_id FROM user_info WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|row| UserInfo {
        email: row.get("email"),
        created_from_ip: row.get("created_from_ip"),
        user_id: row.get("user_id"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CustomRegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// GET /custom-register
pub async fn show_custom_register(State(state): State<AppState>) -> Response {
    custom_register_form(&state, "").into_response()
}

/// POST /custom-register: core registration plus the profile row.
pub async fn submit_custom_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CustomRegisterForm>,
) -> Result<Response, WebError> {
    let mut controller = RegistrationController::default();
    let outcome = controller
        .handle_registration(&state.db, &form.username, &form.password, &form.confirm_password)
        .await?;

    Ok(match outcome {
        RegistrationOutcome::Created(user_id) => {
            insert_user_info(
                state.db.pool(),
                &UserInfo {
                    email: form.email,
                    created_from_ip: client_ip(&headers),
                    user_id,
                },
            )
            .await
            .map_err(latchkey_db::DbError::from)?;
            info!(user_id, "Stored profile info for new user");
            controller.successful_registration().await;
            latchkey_web::pages::register_page(&state.auth.routes, "", true).into_response()
        }
        RegistrationOutcome::Invalid => {
            custom_register_form(&state, &controller.error_message).into_response()
        }
    })
}

/// GET /user-info: profile page for the logged-in user.
pub async fn show_user_info(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
) -> Result<Response, WebError> {
    let info = get_user_info(state.db.pool(), user.id)
        .await
        .map_err(latchkey_db::DbError::from)?;

    let detail = match info {
        Some(info) => format!(
            "<p>Email: {}</p><p>Account Created From: {}</p>",
            info.email, info.created_from_ip
        ),
        None => format!("<p>No extra profile info for user {}</p>", user.id),
    };
    Ok(Html(format!(
        "<h1>User Info</h1><p>Username: {}</p>{detail}",
        user.username
    ))
    .into_response())
}

fn custom_register_form(state: &AppState, error: &str) -> Html<String> {
    let error = if error.is_empty() {
        String::new()
    } else {
        format!(r#"<p role="alert">{error}</p>"#)
    };
    Html(format!(
        r#"<h1>Create an account with Email and IP tracking</h1>
{error}
<form method="post" action="/custom-register">
<label>Username <input name="username" autofocus></label>
<label>Email <input name="email"></label>
<label>Password <input name="password" type="password" value=""></label>
<label>Confirm Password <input name="confirm_password" type="password" value=""></label>
<button type="submit">Sign up</button>
</form>
<p><a href="{login}">Login</a></p>"#,
        login = state.auth.routes.login,
    ))
}
