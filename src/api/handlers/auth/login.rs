//! Login endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::handlers::valid_email;

use super::{
    auth_success_response, error_response, service, state::AuthState, types::LoginRequest,
    validation_error, validation_response,
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login result; success carries a token and the user, failures carry an error list", body = super::types::AuthResponse),
        (status = 400, description = "Missing payload", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_email(&request.email) {
        return validation_response(vec![validation_error("Email is invalid")]);
    }

    match service::login(&pool, &auth_state, &request.email, &request.password).await {
        Ok(authenticated) => auth_success_response(&auth_state, authenticated),
        Err(err) => error_response("login", &err),
    }
}
