//! Server-rendered form markup for the built-in pages

use axum::response::Html;

use latchkey_core::registration::POST_REGISTRATION_DELAY;
use latchkey_core::AuthRoutes;

fn layout(title: &str, description: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="description" content="{description}">
</head>
<body>
{body}
</body>
</html>"#
    ))
}

fn error_callout(error: &str) -> String {
    if error.is_empty() {
        String::new()
    } else {
        format!(r#"<p role="alert">{}</p>"#, escape_html(error))
    }
}

/// Minimal HTML escaping for user-originated values placed in markup.
pub(crate) fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The login form. The password field is always rendered empty; a
/// submitted password never round-trips to the client.
pub fn login_page(routes: &AuthRoutes, error: &str, username: &str, next: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Login</h1>
{error}
<form method="post" action="{action}">
<input type="hidden" name="next" value="{next}">
<label>Username <input name="username" value="{username}" autofocus></label>
<label>Password <input name="password" type="password" value=""></label>
<button type="submit">Sign in</button>
</form>
<p><a href="{register}">Register</a></p>"#,
        error = error_callout(error),
        action = routes.login,
        next = escape_html(next),
        username = escape_html(username),
        register = routes.register,
    );
    layout("Login", "Login via latchkey.", &body)
}

/// The registration form, or the success notice while the post-success
/// redirect delay runs. The notice navigates itself to the login route
/// once the delay elapses; meta refresh only takes whole seconds, so
/// the delay rounds up.
pub fn register_page(routes: &AuthRoutes, error: &str, success: bool) -> Html<String> {
    if success {
        let delay_secs = POST_REGISTRATION_DELAY.as_secs().max(1);
        return Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Register</title>
<meta name="description" content="Register via latchkey.">
<meta http-equiv="refresh" content="{delay_secs};url={login}">
</head>
<body>
<p>Registration successful!</p>
</body>
</html>"#,
            login = routes.login,
        ));
    }
    let body = format!(
        r#"<h1>Create an account</h1>
{error}
<form method="post" action="{action}">
<label>Username <input name="username" autofocus></label>
<label>Password <input name="password" type="password" value=""></label>
<label>Confirm Password <input name="confirm_password" type="password" value=""></label>
<button type="submit">Sign up</button>
</form>
<p><a href="{login}">Login</a></p>"#,
        error = error_callout(error),
        action = routes.register,
        login = routes.login,
    );
    layout("Register", "Register via latchkey.", &body)
}
