//! Password change endpoint for authenticated users.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::handlers::valid_password;

use super::{
    error_response, service, session::require_user, state::AuthState,
    types::{ChangePasswordRequest, SuccessBody},
    unauthorized_response, validation_error, validation_response,
};

#[utoipa::path(
    post,
    path = "/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, or an error list", body = SuccessBody),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Missing or invalid session", body = super::types::ErrorsBody)
    ),
    tag = "auth"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let Some(user_id) = require_user(&headers, &auth_state) else {
        return unauthorized_response();
    };

    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let mut errors = Vec::new();
    if !valid_password(&request.oldpassword) {
        errors.push(validation_error(
            "Old password must be at least 6 characters",
        ));
    }
    if !valid_password(&request.password) {
        errors.push(validation_error("Password must be at least 6 characters"));
    }
    if !valid_password(&request.confirmpassword) {
        errors.push(validation_error(
            "Confirm password must be at least 6 characters",
        ));
    }
    if !errors.is_empty() {
        return validation_response(errors);
    }

    match service::change_password(
        &pool,
        user_id,
        &request.oldpassword,
        &request.password,
        &request.confirmpassword,
    )
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessBody::single("Password has been changed, successfully!")),
        )
            .into_response(),
        Err(err) => error_response("change-password", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::{token::TokenSigner, AuthConfig, AuthState};
    use anyhow::Result;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new("https://konto.dev".to_string()),
            TokenSigner::new(&SecretString::from("test-signing-secret"), 3600),
            Arc::new(LogEmailSender),
        ))
    }

    #[tokio::test]
    async fn change_password_requires_a_session() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = change_password(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn change_password_missing_payload_with_valid_session() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let state = auth_state();
        let token = state.signer().issue(Uuid::new_v4()).expect("token");
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        let response = change_password(headers, Extension(pool), Extension(state), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn change_password_rejects_short_passwords() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let state = auth_state();
        let token = state.signer().issue(Uuid::new_v4()).expect("token");
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        let response = change_password(
            headers,
            Extension(pool),
            Extension(state),
            Some(Json(ChangePasswordRequest {
                oldpassword: "12345".to_string(),
                password: "12345".to_string(),
                confirmpassword: "12345".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let errors = value
            .get("errors")
            .and_then(serde_json::Value::as_array)
            .expect("errors array");
        assert_eq!(errors.len(), 3);
        Ok(())
    }
}
