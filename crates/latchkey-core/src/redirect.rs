//! Redirect decision procedure for the route guard
//!
//! `redir` is evaluated whenever guard-wrapped content is about to
//! render, and explicitly after login and logout. It is a pure function
//! of the request's auth context so transports can re-invoke it freely.

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Inputs to the redirect decision.
#[derive(Debug, Clone)]
pub struct RedirectContext<'a> {
    /// Whether the client-held token has been loaded and is safe to
    /// evaluate. Cookie transports are hydrated on every request;
    /// client-managed token storage may not be on first render.
    pub hydrated: bool,
    pub authenticated: bool,
    pub current_path: &'a str,
    /// Path remembered from a previous unauthenticated visit.
    pub redirect_to: Option<&'a str>,
    /// How many times this render has already deferred on hydration.
    pub defer_count: u32,
}

/// Outcome of the redirect decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Hydration is not ready; re-invoke later with an incremented
    /// defer count.
    Defer,
    /// Navigate to the login route, remembering the current path so
    /// login can return to it.
    ToLogin { remember: String },
    /// Navigate to this path.
    To(String),
    /// No navigation.
    Stay,
}

/// Decide whether the current render requires navigation.
///
/// Once the defer count reaches the configured bound the decision gives
/// up with [`AuthError::HydrationTimeout`] rather than re-queueing
/// forever on a host that never completes hydration.
pub fn redir(ctx: &RedirectContext<'_>, config: &AuthConfig) -> Result<RedirectDecision, AuthError> {
    if !ctx.hydrated {
        if ctx.defer_count >= config.max_hydration_defers {
            return Err(AuthError::HydrationTimeout);
        }
        return Ok(RedirectDecision::Defer);
    }

    let login_route = config.routes.login.as_str();
    if !ctx.authenticated && ctx.current_path != login_route {
        return Ok(RedirectDecision::ToLogin {
            remember: ctx.current_path.to_string(),
        });
    }
    if ctx.authenticated && ctx.current_path == login_route {
        let target = ctx
            .redirect_to
            .filter(|r| !r.is_empty())
            .unwrap_or("/")
            .to_string();
        return Ok(RedirectDecision::To(target));
    }
    Ok(RedirectDecision::Stay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(hydrated: bool, authenticated: bool, current_path: &'a str) -> RedirectContext<'a> {
        RedirectContext {
            hydrated,
            authenticated,
            current_path,
            redirect_to: None,
            defer_count: 0,
        }
    }

    #[test]
    fn test_defers_until_hydrated() {
        let config = AuthConfig::default();
        let decision = redir(&ctx(false, false, "/protected"), &config).unwrap();
        assert_eq!(decision, RedirectDecision::Defer);
    }

    #[test]
    fn test_defer_bound_gives_up() {
        let config = AuthConfig::default();
        let mut context = ctx(false, false, "/protected");
        context.defer_count = config.max_hydration_defers;
        let err = redir(&context, &config).unwrap_err();
        assert!(matches!(err, AuthError::HydrationTimeout));
    }

    #[test]
    fn test_anonymous_off_login_redirects_and_remembers() {
        let config = AuthConfig::default();
        let decision = redir(&ctx(true, false, "/protected"), &config).unwrap();
        assert_eq!(
            decision,
            RedirectDecision::ToLogin {
                remember: "/protected".to_string()
            }
        );
    }

    #[test]
    fn test_anonymous_on_login_stays() {
        let config = AuthConfig::default();
        let decision = redir(&ctx(true, false, "/login"), &config).unwrap();
        assert_eq!(decision, RedirectDecision::Stay);
    }

    #[test]
    fn test_authenticated_on_login_goes_to_remembered_path() {
        let config = AuthConfig::default();
        let mut context = ctx(true, true, "/login");
        context.redirect_to = Some("/protected");
        let decision = redir(&context, &config).unwrap();
        assert_eq!(decision, RedirectDecision::To("/protected".to_string()));
    }

    #[test]
    fn test_authenticated_on_login_defaults_to_root() {
        let config = AuthConfig::default();
        let decision = redir(&ctx(true, true, "/login"), &config).unwrap();
        assert_eq!(decision, RedirectDecision::To("/".to_string()));

        let mut context = ctx(true, true, "/login");
        context.redirect_to = Some("");
        let decision = redir(&context, &config).unwrap();
        assert_eq!(decision, RedirectDecision::To("/".to_string()));
    }

    #[test]
    fn test_authenticated_elsewhere_stays() {
        let config = AuthConfig::default();
        let decision = redir(&ctx(true, true, "/protected"), &config).unwrap();
        assert_eq!(decision, RedirectDecision::Stay);
    }

    #[test]
    fn test_honors_overridden_login_route() {
        let mut config = AuthConfig::default();
        config.routes.login = "/signin".to_string();

        let decision = redir(&ctx(true, false, "/signin"), &config).unwrap();
        assert_eq!(decision, RedirectDecision::Stay);

        let decision = redir(&ctx(true, false, "/login"), &config).unwrap();
        assert_eq!(
            decision,
            RedirectDecision::ToLogin {
                remember: "/login".to_string()
            }
        );
    }
}
