//! Request/response types for the account endpoints.

use crate::api::handlers::auth::storage::UserRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirmpassword: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub oldpassword: String,
    pub password: String,
    pub confirmpassword: String,
}

/// User as serialized in responses; never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PublicUser {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub username: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            username: user.username,
            activated: user.activated,
            created_at: user.created_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetDetailsResponse {
    pub code: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorDetail {
    pub kind: String,
    pub msg: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorsBody {
    pub errors: Vec<ErrorDetail>,
}

impl ErrorsBody {
    #[must_use]
    pub fn single(kind: &str, msg: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorDetail {
                kind: kind.to_string(),
                msg: msg.into(),
            }],
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    pub msg: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SuccessBody {
    pub success: Vec<Message>,
}

impl SuccessBody {
    #[must_use]
    pub fn single(msg: impl Into<String>) -> Self {
        Self {
            success: vec![Message { msg: msg.into() }],
        }
    }
}
