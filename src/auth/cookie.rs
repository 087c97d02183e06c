use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const AUTH_COOKIE: &str = "auth_token";

pub fn auth_cookie(token: &str, max_age: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = if secure { "Secure; " } else { "" };
    HeaderValue::from_str(&format!(
        "{AUTH_COOKIE}={token}; HttpOnly; {secure}SameSite=Strict; Path=/; Max-Age={max_age}"
    ))
}

/// Same cookie name, empty value, `Max-Age=0`.
pub fn clear_auth_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    auth_cookie("", 0, secure)
}

/// Finds a non-empty `auth_token` pair in any `Cookie` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(AUTH_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
        .map(str::to_owned)
}
