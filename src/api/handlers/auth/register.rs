//! Registration endpoint.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::handlers::{valid_email, valid_password};

use super::{
    auth_success_response, error_response, service, state::AuthState, types::RegisterRequest,
    validation_error, validation_response,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration result; success carries a token and the user, failures carry an error list", body = super::types::AuthResponse),
        (status = 400, description = "Missing payload", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let mut errors = Vec::new();
    if request.firstname.trim().is_empty() {
        errors.push(validation_error("Firstname is required"));
    }
    if request.lastname.trim().is_empty() {
        errors.push(validation_error("Lastname is required"));
    }
    if !valid_email(&request.email) {
        errors.push(validation_error("Email is invalid"));
    }
    if !valid_password(&request.password) {
        errors.push(validation_error("Password must be at least 6 characters"));
    }
    if !errors.is_empty() {
        return validation_response(errors);
    }

    match service::register(&pool, &auth_state, request).await {
        Ok(authenticated) => auth_success_response(&auth_state, authenticated),
        Err(err) => error_response("register", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::{token::TokenSigner, AuthConfig};
    use anyhow::Result;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new("https://konto.dev".to_string()),
            TokenSigner::new(&SecretString::from("test-signing-secret"), 3600),
            Arc::new(LogEmailSender),
        ))
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_invalid_shape_before_touching_the_store() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(RegisterRequest {
                firstname: String::new(),
                lastname: "Doe".to_string(),
                email: "not-an-email".to_string(),
                password: "12345".to_string(),
            })),
        )
        .await
        .into_response();
        // Validation failures keep HTTP 200 and report via the error list.
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let errors = value
            .get("errors")
            .and_then(serde_json::Value::as_array)
            .expect("errors array");
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|entry| entry.get("kind").and_then(serde_json::Value::as_str)
                == Some("validation_failed")));
        Ok(())
    }
}
