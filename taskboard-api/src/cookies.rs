/// Refresh-token cookie handling
///
/// The refresh token travels only in an HttpOnly cookie scoped to `/auth`,
/// so scripts can't read it and it is never sent to the resource routes.
///
/// ```text
/// Set-Cookie: refresh_token=<jwt>; Path=/auth; Max-Age=604800; HttpOnly; SameSite=Lax[; Secure]
/// ```

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

use crate::error::ApiError;

/// Cookie name
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Path the cookie is scoped to
pub const REFRESH_COOKIE_PATH: &str = "/auth";

/// Builds the `Set-Cookie` value carrying a refresh token
pub fn refresh_cookie(token: &str, max_age: Duration, secure: bool) -> Result<HeaderValue, ApiError> {
    build(token, max_age.num_seconds(), secure)
}

/// Builds the `Set-Cookie` value that removes the refresh cookie
pub fn clear_refresh_cookie(secure: bool) -> HeaderValue {
    // Only static ASCII goes into this value
    build("", 0, secure).unwrap_or_else(|_| HeaderValue::from_static("refresh_token=; Max-Age=0"))
}

fn build(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        REFRESH_COOKIE, value, REFRESH_COOKIE_PATH, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie value: {}", e)))
}

/// Reads a cookie from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
