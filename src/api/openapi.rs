use crate::api::handlers::auth::types::{
    AuthResponse, ChangePasswordRequest, ErrorDetail, ErrorsBody, ForgotPasswordRequest,
    LoginRequest, Message, PublicUser, RegisterRequest, ResetDetailsResponse,
    ResetPasswordRequest, SuccessBody,
};
use utoipa::OpenApi;

/// `OpenAPI` document for the account API.
///
/// Add new endpoints to `paths(...)` so they show up in `/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::activation::resend_activation,
        crate::api::handlers::auth::activation::activate_account,
        crate::api::handlers::auth::reset::forgot_password,
        crate::api::handlers::auth::reset::get_reset_details,
        crate::api::handlers::auth::reset::complete_reset_password,
        crate::api::handlers::auth::change_password::change_password,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        ChangePasswordRequest,
        AuthResponse,
        PublicUser,
        ResetDetailsResponse,
        ErrorDetail,
        ErrorsBody,
        Message,
        SuccessBody,
    )),
    tags(
        (name = "konto", description = "User account service"),
        (name = "auth", description = "Registration, login, and password lifecycle"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
