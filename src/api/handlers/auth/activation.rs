//! Account activation endpoints.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    error_response, service, session::require_user, state::AuthState, types::SuccessBody,
    unauthorized_response,
};

/// Activate the account referenced by a valid, unexpired code.
#[utoipa::path(
    get,
    path = "/auth/activate-account/{code}",
    params(
        ("code" = String, Path, description = "Activation code from the email link")
    ),
    responses(
        (status = 201, description = "Account activated", body = SuccessBody),
        (status = 200, description = "Invalid or expired code", body = super::types::ErrorsBody)
    ),
    tag = "auth"
)]
pub async fn activate_account(
    pool: Extension<PgPool>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match service::activate_account(&pool, &code).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(SuccessBody::single("Account activated")),
        )
            .into_response(),
        Err(err) => error_response("activate-account", &err),
    }
}

/// Re-send the activation email for the authenticated user.
#[utoipa::path(
    post,
    path = "/auth/resend-activation",
    responses(
        (status = 200, description = "Activation email re-sent", body = SuccessBody),
        (status = 401, description = "Missing or invalid session", body = super::types::ErrorsBody)
    ),
    tag = "auth"
)]
pub async fn resend_activation(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let Some(user_id) = require_user(&headers, &auth_state) else {
        return unauthorized_response();
    };

    match service::resend_activation(&pool, &auth_state, user_id).await {
        Ok(email) => (
            StatusCode::OK,
            Json(SuccessBody::single(format!(
                "Activation link sent to {email}"
            ))),
        )
            .into_response(),
        Err(err) => error_response("resend-activation", &err),
    }
}
