//! Session cookie and route protection
//!
//! The bearer token lives in a `token` cookie scoped to the whole site.
//! Page routes are gated here; API action routes answer 401 JSON instead
//! and are deliberately outside the guard.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie holding the upstream bearer token
pub const SESSION_COOKIE: &str = "token";

const SESSION_LIFETIME_DAYS: i64 = 7;

/// Build the session cookie set after login/signup
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Strict);
    cookie.set_max_age(time::Duration::days(SESSION_LIFETIME_DAYS));
    cookie
}

/// Cookie matcher used for removal (name and path must match the set cookie)
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// Extract the bearer token from the request cookies
pub fn token_from(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Where a page request should be redirected, if anywhere.
///
/// Protected pages require a token; the landing, login, and signup pages
/// bounce authenticated users to the dashboard.
fn redirect_target(path: &str, has_token: bool) -> Option<&'static str> {
    let is_protected = path.starts_with("/dashboard")
        || path.starts_with("/conversations")
        || path.starts_with("/people")
        || path == "/profile";
    let is_auth_route = path == "/login" || path == "/signup";
    let is_home = path == "/";

    if is_protected && !has_token {
        return Some("/login");
    }
    if has_token && (is_auth_route || is_home) {
        return Some("/dashboard");
    }
    None
}

/// Middleware applied to the page router
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let has_token = jar.get(SESSION_COOKIE).is_some();
    if let Some(target) = redirect_target(request.uri().path(), has_token) {
        return Redirect::temporary(target).into_response();
    }
    next.run(request).await
}

/// Drop a rejected session cookie and send the browser back to login
pub fn expire_and_redirect(jar: CookieJar) -> Response {
    let jar = jar.remove(expired_session_cookie());
    (jar, Redirect::temporary("/login")).into_response()
}
