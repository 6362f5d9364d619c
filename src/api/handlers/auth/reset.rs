//! Password reset endpoints: request, confirm, and complete.

use axum::{
    extract::{Extension, Path},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::handlers::{valid_email, valid_password};

use super::{
    error_response, service, state::AuthState,
    types::{ForgotPasswordRequest, ResetDetailsResponse, ResetPasswordRequest, SuccessBody},
    validation_error, validation_response,
};

/// Issue a reset code and email a reset link to the account holder.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent, or an error list", body = SuccessBody),
        (status = 400, description = "Missing payload", body = String)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_email(&request.email) {
        return validation_response(vec![validation_error("Email is invalid")]);
    }

    // The reset email names the client the request came from.
    let client_context = headers.get(USER_AGENT).and_then(|value| value.to_str().ok());

    match service::forgot_password(&pool, &auth_state, &request.email, client_context).await {
        Ok(email) => (
            StatusCode::OK,
            Json(SuccessBody::single(format!("Reset link sent to {email}"))),
        )
            .into_response(),
        Err(err) => error_response("forgot-password", &err),
    }
}

/// Return the reset record so the UI can confirm the form before submission.
#[utoipa::path(
    get,
    path = "/auth/reset-password/{code}",
    params(
        ("code" = String, Path, description = "Reset code from the email link")
    ),
    responses(
        (status = 200, description = "Reset details, or an error list", body = ResetDetailsResponse)
    ),
    tag = "auth"
)]
pub async fn get_reset_details(
    pool: Extension<PgPool>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match service::reset_details(&pool, &code).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ResetDetailsResponse {
                code: record.code,
                email: record.email.unwrap_or_default(),
                expires_at: record.expires_at,
            }),
        )
            .into_response(),
        Err(err) => error_response("get-reset-details", &err),
    }
}

/// Consume the reset code and store the new password.
#[utoipa::path(
    post,
    path = "/auth/reset-password/{code}",
    request_body = ResetPasswordRequest,
    params(
        ("code" = String, Path, description = "Reset code from the email link")
    ),
    responses(
        (status = 200, description = "Password changed, or an error list", body = SuccessBody),
        (status = 400, description = "Missing payload", body = String)
    ),
    tag = "auth"
)]
pub async fn complete_reset_password(
    pool: Extension<PgPool>,
    Path(code): Path<String>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let mut errors = Vec::new();
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

    match service::complete_reset_password(
        &pool,
        &code,
        &request.password,
        &request.confirmpassword,
    )
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessBody::single(
                "Password has been changed, Kindly sign in to continue.",
            )),
        )
            .into_response(),
        Err(err) => error_response("complete-reset-password", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::{token::TokenSigner, AuthConfig, AuthState};
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
    async fn forgot_password_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = forgot_password(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn forgot_password_rejects_malformed_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = forgot_password(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(ForgotPasswordRequest {
                email: "not-an-email".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert!(value.get("errors").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn complete_reset_rejects_short_passwords() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = complete_reset_password(
            Extension(pool),
            Path("some-code".to_string()),
            Some(Json(ResetPasswordRequest {
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
        assert_eq!(errors.len(), 2);
        Ok(())
    }
}
