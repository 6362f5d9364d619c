//! Registration, login, activation, and password lifecycle.
//!
//! The credential logic lives in [`service`]; the sibling modules hold the
//! pieces it orchestrates: password hashing, session token signing, single-use
//! codes, and row-level storage helpers. Handler modules stay thin and only
//! parse payloads, validate shapes, and map service results to JSON.

pub mod activation;
pub mod change_password;
pub mod codes;
pub mod login;
pub mod password;
pub mod register;
pub mod reset;
pub mod service;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;

pub use self::state::{AuthConfig, AuthState};

use axum::{
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use self::service::{AuthError, Authenticated};
use self::types::{AuthResponse, ErrorDetail, ErrorsBody};

/// Map a service error to the structured error body.
///
/// Domain errors keep HTTP 200 (the status carries no signal; the body does).
/// Unexpected faults are logged before being flattened to the generic body.
pub(crate) fn error_response(operation: &str, err: &AuthError) -> Response {
    if let AuthError::Unexpected(inner) = err {
        error!("{operation} failed: {inner:?}");
    }
    (
        StatusCode::OK,
        Json(ErrorsBody::single(err.kind(), err.to_string())),
    )
        .into_response()
}

pub(crate) fn validation_error(msg: &str) -> ErrorDetail {
    ErrorDetail {
        kind: "validation_failed".to_string(),
        msg: msg.to_string(),
    }
}

pub(crate) fn validation_response(errors: Vec<ErrorDetail>) -> Response {
    (StatusCode::OK, Json(ErrorsBody { errors })).into_response()
}

pub(crate) fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorsBody::single("invalid_token", "Authentication required")),
    )
        .into_response()
}

/// Successful register/login response: body plus the `AUTH-TOKEN` cookie.
pub(crate) fn auth_success_response(state: &AuthState, authenticated: Authenticated) -> Response {
    let mut headers = HeaderMap::new();
    match session::session_cookie(state.config(), &authenticated.token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }

    let body = AuthResponse {
        token: authenticated.token,
        user: authenticated.user.into(),
    };
    (StatusCode::OK, headers, Json(body)).into_response()
}
