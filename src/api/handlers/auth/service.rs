//! Core credential operations.
//!
//! Each operation runs to completion against the store and converts every
//! lower-layer fault into [`AuthError::Unexpected`] at its boundary; callers
//! receive structured errors, never propagated panics or raw database faults.

use crate::api::email;
use crate::api::handlers::auth::{
    codes::{self, CodeKind, SingleUseCode},
    password,
    state::AuthState,
    storage::{self, InsertOutcome, NewUser, UserRecord},
    token::TokenError,
    types::RegisterRequest,
};
use anyhow::Context;
use chrono::Duration;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account already exist with this email, Login instead")]
    DuplicateEmail,
    #[error("This email/password is incorrect")]
    InvalidCredentials,
    #[error("{} code is invalid", .0.label())]
    InvalidCode(CodeKind),
    #[error("{} link is expired", .0.label())]
    ExpiredCode(CodeKind),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("This email does not exist on our system")]
    UnknownEmail,
    #[error("An error occurred, try again")]
    Unexpected(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable machine-readable kind for the error body.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "duplicate_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidCode(_) => "invalid_code",
            Self::ExpiredCode(_) => "expired_code",
            Self::PasswordMismatch => "password_mismatch",
            Self::UnknownEmail => "unknown_email",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Unexpected(anyhow::Error::new(err))
    }
}

/// Result of a successful registration or login.
#[derive(Debug)]
pub struct Authenticated {
    pub token: String,
    pub user: UserRecord,
}

/// Create an unactivated user, email an activation code, and sign them in.
///
/// The activation email is awaited; a failed send surfaces as the generic
/// error even though the user and code rows are already committed.
///
/// # Errors
/// Fails with [`AuthError::DuplicateEmail`] when the email is taken.
pub async fn register(
    pool: &PgPool,
    state: &AuthState,
    request: RegisterRequest,
) -> Result<Authenticated, AuthError> {
    let username = storage::derive_username(&request.firstname);
    let password_hash = password::hash_password(&request.password)?;
    let new_user = NewUser {
        firstname: request.firstname,
        lastname: request.lastname,
        email: request.email,
        username,
        password_hash,
    };

    let user = match storage::insert_user(pool, &new_user).await? {
        InsertOutcome::Created(user) => user,
        InsertOutcome::DuplicateEmail => return Err(AuthError::DuplicateEmail),
    };

    let code = codes::issue(
        pool,
        user.id,
        CodeKind::Activation,
        Duration::hours(state.config().activation_ttl_hours()),
        None,
    )
    .await?;

    let message = email::activation_email(state.config(), &user, &code);
    state.sender().send(&message).await?;

    let token = state.signer().issue(user.id)?;
    Ok(Authenticated { token, user })
}

/// Authenticate by email and password.
///
/// Absent users and wrong passwords fail identically so callers cannot
/// enumerate accounts. Activation is not checked; unactivated users may
/// log in.
///
/// # Errors
/// Fails with [`AuthError::InvalidCredentials`].
pub async fn login(
    pool: &PgPool,
    state: &AuthState,
    email: &str,
    plaintext: &str,
) -> Result<Authenticated, AuthError> {
    let Some(user) = storage::lookup_user_by_email(pool, email).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password(plaintext, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = state.signer().issue(user.id)?;
    Ok(Authenticated { token, user })
}

/// Issue a fresh activation code for an authenticated user and re-send the
/// email. Earlier codes stay live until they expire or are consumed.
///
/// Returns the email the code was sent to.
///
/// # Errors
/// Fails with [`AuthError::InvalidCredentials`] when the user no longer exists.
pub async fn resend_activation(
    pool: &PgPool,
    state: &AuthState,
    user_id: Uuid,
) -> Result<String, AuthError> {
    let Some(user) = storage::lookup_user(pool, user_id).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    let code = codes::issue(
        pool,
        user.id,
        CodeKind::Activation,
        Duration::hours(state.config().resend_activation_ttl_hours()),
        None,
    )
    .await?;

    let message = email::activation_email(state.config(), &user, &code);
    state.sender().send(&message).await?;

    Ok(user.email)
}

/// Consume a valid, unexpired activation code and activate its user.
///
/// Re-activating an already-active user is harmless; reusing a consumed code
/// fails like an unknown one.
///
/// # Errors
/// Fails with [`AuthError::InvalidCode`] or [`AuthError::ExpiredCode`].
pub async fn activate_account(pool: &PgPool, code: &str) -> Result<(), AuthError> {
    let Some(record) = codes::find(pool, CodeKind::Activation, code).await? else {
        return Err(AuthError::InvalidCode(CodeKind::Activation));
    };

    if record.is_expired() {
        return Err(AuthError::ExpiredCode(CodeKind::Activation));
    }

    let mut tx = pool
        .begin()
        .await
        .context("begin activation transaction")?;

    if !codes::consume(&mut tx, CodeKind::Activation, &record.code).await? {
        // Lost a race with a concurrent request holding the same code.
        tx.rollback()
            .await
            .context("rollback activation transaction")?;
        return Err(AuthError::InvalidCode(CodeKind::Activation));
    }

    storage::activate_user(&mut tx, record.user_id).await?;

    tx.commit().await.context("commit activation transaction")?;
    Ok(())
}

/// Issue a reset code for the account matching `email` and send the reset
/// email, including the requesting client context when provided.
///
/// Returns the email the code was sent to.
///
/// # Errors
/// Fails with [`AuthError::UnknownEmail`] when no account matches.
pub async fn forgot_password(
    pool: &PgPool,
    state: &AuthState,
    email: &str,
    client_context: Option<&str>,
) -> Result<String, AuthError> {
    let Some(user) = storage::lookup_user_by_email(pool, email).await? else {
        return Err(AuthError::UnknownEmail);
    };

    let code = codes::issue(
        pool,
        user.id,
        CodeKind::Reset,
        Duration::hours(state.config().reset_ttl_hours()),
        Some(&user.email),
    )
    .await?;

    let message = email::reset_email(state.config(), &user, &code, client_context);
    state.sender().send(&message).await?;

    Ok(user.email)
}

/// Look up a reset code so the UI can confirm the form before submission.
///
/// Expired codes fail here too, matching activation.
///
/// # Errors
/// Fails with [`AuthError::InvalidCode`] or [`AuthError::ExpiredCode`].
pub async fn reset_details(pool: &PgPool, code: &str) -> Result<SingleUseCode, AuthError> {
    let Some(record) = codes::find(pool, CodeKind::Reset, code).await? else {
        return Err(AuthError::InvalidCode(CodeKind::Reset));
    };

    if record.is_expired() {
        return Err(AuthError::ExpiredCode(CodeKind::Reset));
    }

    Ok(record)
}

/// Consume a valid reset code and store the new password hash.
///
/// # Errors
/// Fails with [`AuthError::InvalidCode`], [`AuthError::ExpiredCode`], or
/// [`AuthError::PasswordMismatch`]; the stored hash is untouched on failure.
pub async fn complete_reset_password(
    pool: &PgPool,
    code: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), AuthError> {
    let Some(record) = codes::find(pool, CodeKind::Reset, code).await? else {
        return Err(AuthError::InvalidCode(CodeKind::Reset));
    };

    if record.is_expired() {
        return Err(AuthError::ExpiredCode(CodeKind::Reset));
    }

    if new_password != confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let password_hash = password::hash_password(new_password)?;

    let mut tx = pool.begin().await.context("begin reset transaction")?;

    if !codes::consume(&mut tx, CodeKind::Reset, &record.code).await? {
        tx.rollback().await.context("rollback reset transaction")?;
        return Err(AuthError::InvalidCode(CodeKind::Reset));
    }

    storage::update_password_hash(&mut tx, record.user_id, &password_hash).await?;

    tx.commit().await.context("commit reset transaction")?;
    Ok(())
}

/// Replace the password for an authenticated user after checking the old one.
///
/// # Errors
/// Fails with [`AuthError::InvalidCredentials`] when the old password does not
/// match, or [`AuthError::PasswordMismatch`] when the confirmation differs.
pub async fn change_password(
    pool: &PgPool,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), AuthError> {
    let Some(user) = storage::lookup_user(pool, user_id).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password(old_password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    if new_password != confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let password_hash = password::hash_password(new_password)?;

    let mut tx = pool
        .begin()
        .await
        .context("begin change-password transaction")?;

    storage::update_password_hash(&mut tx, user.id, &password_hash).await?;

    tx.commit()
        .await
        .context("commit change-password transaction")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(AuthError::DuplicateEmail.kind(), "duplicate_email");
        assert_eq!(AuthError::InvalidCredentials.kind(), "invalid_credentials");
        assert_eq!(
            AuthError::InvalidCode(CodeKind::Activation).kind(),
            "invalid_code"
        );
        assert_eq!(
            AuthError::ExpiredCode(CodeKind::Reset).kind(),
            "expired_code"
        );
        assert_eq!(AuthError::PasswordMismatch.kind(), "password_mismatch");
        assert_eq!(AuthError::UnknownEmail.kind(), "unknown_email");
        assert_eq!(
            AuthError::Unexpected(anyhow!("boom")).kind(),
            "unexpected"
        );
    }

    #[test]
    fn error_messages_name_the_code_kind() {
        assert_eq!(
            AuthError::InvalidCode(CodeKind::Activation).to_string(),
            "Activation code is invalid"
        );
        assert_eq!(
            AuthError::InvalidCode(CodeKind::Reset).to_string(),
            "Reset code is invalid"
        );
        assert_eq!(
            AuthError::ExpiredCode(CodeKind::Activation).to_string(),
            "Activation link is expired"
        );
    }

    #[test]
    fn unexpected_hides_the_underlying_fault() {
        let err = AuthError::Unexpected(anyhow!("connection refused"));
        assert_eq!(err.to_string(), "An error occurred, try again");
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        // Unknown email and wrong password share one kind and message.
        let unknown = AuthError::InvalidCredentials;
        let wrong = AuthError::InvalidCredentials;
        assert_eq!(unknown.kind(), wrong.kind());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
