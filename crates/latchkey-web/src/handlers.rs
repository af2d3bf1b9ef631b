//! Login, registration, and logout handlers plus page registration

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::debug;

use latchkey_core::{
    redir, AuthConfig, AuthRoutes, LoginController, LoginOutcome, RedirectContext,
    RedirectDecision, RegistrationController, RegistrationOutcome,
};

use crate::error::WebError;
use crate::extract::{ClientSession, AUTH_TOKEN_COOKIE_NAME};
use crate::pages;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct NextQuery {
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Persist the session token client-side.
///
/// The cookie lifetime tracks the session TTL so the token survives
/// browser restarts for as long as the server-side session does.
/// Also called with an unchanged token value: the re-set is the
/// client-visible "touch" that forces a state change after login and
/// logout.
fn token_cookie(token: &str, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((AUTH_TOKEN_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_ttl.num_seconds()))
        .build()
}

/// GET login page. An already-authenticated visitor is sent back to the
/// remembered path, or the site root.
async fn show_login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    ClientSession(mut auth): ClientSession,
) -> Result<Response, WebError> {
    let identity = auth.resolve().await?;
    let decision = redir(
        &RedirectContext {
            hydrated: true,
            authenticated: identity.is_authenticated(),
            current_path: &state.auth.routes.login,
            redirect_to: Some(&query.next),
            defer_count: 0,
        },
        &state.auth,
    )?;

    Ok(match decision {
        RedirectDecision::To(target) => Redirect::to(&target).into_response(),
        _ => pages::login_page(&state.auth.routes, "", "", &query.next).into_response(),
    })
}

/// POST login form.
async fn submit_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ClientSession(mut auth): ClientSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let mut controller = LoginController::new(Some(form.next.clone()));

    match controller
        .on_submit(&mut auth, &form.username, &form.password)
        .await?
    {
        LoginOutcome::Success => {
            let decision = redir(
                &RedirectContext {
                    hydrated: true,
                    authenticated: true,
                    current_path: &state.auth.routes.login,
                    redirect_to: controller.redirect_to.as_deref(),
                    defer_count: 0,
                },
                &state.auth,
            )?;
            let target = match decision {
                RedirectDecision::To(target) => target,
                _ => "/".to_string(),
            };
            // login() may have minted a fresh token; persist whichever
            // token is now durable.
            let jar = match auth.token() {
                Some(token) => jar.add(token_cookie(token, &state.auth)),
                None => jar,
            };
            Ok((jar, Redirect::to(&target)).into_response())
        }
        LoginOutcome::Failure => {
            debug!(username = form.username, "Login failed");
            // Username is preserved; the password field renders empty.
            Ok(pages::login_page(
                &state.auth.routes,
                &controller.error_message,
                &form.username,
                &form.next,
            )
            .into_response())
        }
    }
}

/// POST logout. The cookie removal is the forced client-visible touch.
async fn submit_logout(
    ClientSession(mut auth): ClientSession,
    jar: CookieJar,
) -> Result<Response, WebError> {
    auth.logout().await?;
    let jar = jar.remove(Cookie::build((AUTH_TOKEN_COOKIE_NAME, "")).path("/").build());
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET registration page.
async fn show_register(State(state): State<AppState>) -> Response {
    pages::register_page(&state.auth.routes, "", false).into_response()
}

/// POST registration form.
async fn submit_register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    let mut controller = RegistrationController::default();
    let outcome = controller
        .handle_registration(&state.db, &form.username, &form.password, &form.confirm_password)
        .await?;

    Ok(match outcome {
        RegistrationOutcome::Created(_) => {
            controller.successful_registration().await;
            // The success notice carries its own navigation to the
            // login route once the post-registration delay elapses.
            pages::register_page(&state.auth.routes, "", true).into_response()
        }
        RegistrationOutcome::Invalid => {
            pages::register_page(&state.auth.routes, &controller.error_message, false)
                .into_response()
        }
    })
}

/// Register the login and registration pages and the logout endpoint
/// with the host application's router.
///
/// The route surface comes from the host's [`AuthRoutes`]; call this
/// after overriding the defaults.
pub fn add_routes(router: Router<AppState>, routes: &AuthRoutes) -> Router<AppState> {
    router
        .route(&routes.login, get(show_login).post(submit_login))
        .route(&routes.register, get(show_register).post(submit_register))
        .route("/logout", post(submit_logout))
}
