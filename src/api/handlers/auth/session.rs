//! `AUTH-TOKEN` cookie handling and request authentication.

use crate::api::handlers::auth::state::{AuthConfig, AuthState};
use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use uuid::Uuid;

const SESSION_COOKIE_NAME: &str = "AUTH-TOKEN";

/// Build the `HttpOnly` cookie carrying the session token.
///
/// The cookie max-age (7 days by default) deliberately outlives the token's
/// own expiry; verification always re-checks the embedded expiry.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.cookie_max_age_seconds();
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    HeaderValue::from_str(&cookie)
}

/// Resolve the authenticated user id from the bearer header or cookie.
///
/// Returns `None` when no token is present or verification fails; callers
/// respond 401 without distinguishing why.
pub(crate) fn require_user(headers: &HeaderMap, state: &AuthState) -> Option<Uuid> {
    let token = extract_session_token(headers)?;
    state.signer().verify(&token).ok()
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
