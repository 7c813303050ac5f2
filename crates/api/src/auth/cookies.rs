//! Auth cookies and bearer-token resolution.
//!
//! Tokens are delivered both in JSON bodies and as `httpOnly`,
//! `SameSite=Strict` cookies. When reading a request, the `Authorization`
//! header wins over the cookie.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Cookie carrying the access token.
pub const AUTH_COOKIE: &str = "AUTH-TOKEN";
/// Cookie carrying the raw refresh token.
pub const REFRESH_COOKIE: &str = "REFRESH-TOKEN";

/// Build a `Set-Cookie` value for a token that lives `max_age_secs`.
pub fn token_cookie(name: &'static str, value: &str, max_age_secs: i64, secure: bool) -> String {
    Cookie::build((name, value.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_secs))
        .build()
        .to_string()
}

/// Build a `Set-Cookie` value that makes the browser drop `name`.
pub fn removal_cookie(name: &'static str, secure: bool) -> String {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
        .to_string()
}

/// Value of the cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the access token: `Authorization: Bearer` first, then the
/// `AUTH-TOKEN` cookie.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    from_header.or_else(|| cookie_value(headers, AUTH_COOKIE))
}
