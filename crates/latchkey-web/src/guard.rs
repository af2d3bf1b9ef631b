//! Route guard extractor

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use latchkey_core::{redir, Identity, RedirectContext, RedirectDecision};
use latchkey_db::LocalUser;

use crate::error::WebError;
use crate::extract::ClientSession;
use crate::state::AppState;

/// Extractor for protected pages: rejects unauthenticated requests with
/// a redirect to the login route, remembering the original path so
/// login can return to it.
///
/// Cookie transports are hydrated on every request, so the guard
/// evaluates the redirect decision with `hydrated: true`; hosts with
/// client-managed token storage drive [`redir`] themselves from a
/// placeholder render, incrementing the defer count on each retry.
pub struct RequireLogin(pub LocalUser);

impl<S> FromRequestParts<S> for RequireLogin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let ClientSession(mut auth) = ClientSession::from_request_parts(parts, state).await?;

        let identity = auth.resolve().await.map_err(WebError::Auth)?;
        let current_path = parts.uri.path().to_string();

        let decision = redir(
            &RedirectContext {
                hydrated: true,
                authenticated: identity.is_authenticated(),
                current_path: &current_path,
                redirect_to: None,
                defer_count: 0,
            },
            &app_state.auth,
        )
        .map_err(WebError::Auth)?;

        match (identity, decision) {
            (Identity::User(user), _) => Ok(RequireLogin(user)),
            (Identity::Anonymous, RedirectDecision::ToLogin { remember }) => Err(
                WebError::LoginRequired(login_path_with_next(&app_state.auth.routes.login, &remember)),
            ),
            (Identity::Anonymous, _) => Err(WebError::LoginRequired(
                app_state.auth.routes.login.clone(),
            )),
        }
    }
}

/// Build the login path carrying the origin path to return to.
pub(crate) fn login_path_with_next(login_route: &str, next: &str) -> String {
    if next.is_empty() || next == "/" {
        login_route.to_string()
    } else {
        format!("{login_route}?next={next}")
    }
}
