//! Token transport and auth session extraction

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use latchkey_core::AuthSession;

use crate::error::WebError;
use crate::state::AppState;

/// Fixed key under which the client stores the durable session token.
pub const AUTH_TOKEN_COOKIE_NAME: &str = "_auth_token";

/// Extract a bearer token from an Authorization header value.
fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

/// The client-held session token for this request, if any.
///
/// The cookie is the primary transport; an `Authorization: Bearer`
/// header is accepted as a fallback for non-browser clients. Absence
/// implies anonymous.
pub fn client_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(AUTH_TOKEN_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
}

/// Extractor building the request-scoped [`AuthSession`] from the
/// client token. Never rejects; an absent token yields an anonymous
/// session.
pub struct ClientSession(pub AuthSession);

impl<S> FromRequestParts<S> for ClientSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = client_token(parts);
        Ok(ClientSession(AuthSession::new(
            app_state.db.clone(),
            app_state.auth.clone(),
            token,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_cookie_token_preferred() {
        let parts = parts_with_headers(&[
            ("cookie", "_auth_token=tok-cookie"),
            ("authorization", "Bearer tok-bearer"),
        ]);
        assert_eq!(client_token(&parts).as_deref(), Some("tok-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let parts = parts_with_headers(&[("authorization", "Bearer tok-bearer")]);
        assert_eq!(client_token(&parts).as_deref(), Some("tok-bearer"));
    }

    #[test]
    fn test_absent_or_malformed_token_is_none() {
        assert_eq!(client_token(&parts_with_headers(&[])), None);
        assert_eq!(
            client_token(&parts_with_headers(&[("authorization", "Basic abc")])),
            None
        );
        assert_eq!(
            client_token(&parts_with_headers(&[("authorization", "Bearer ")])),
            None
        );
        assert_eq!(
            client_token(&parts_with_headers(&[("cookie", "_auth_token=")])),
            None
        );
    }
}
