//! Email delivery abstraction and account email templates.
//!
//! Account operations (register, resend activation, forgot password) render a
//! template and hand the message to an [`EmailSender`]. Delivery is awaited by
//! the calling operation; a failed send surfaces as a generic failure without
//! rolling back rows that were already written.
//!
//! The default sender for local dev is [`LogEmailSender`], which logs and
//! returns `Ok(())`. [`HttpEmailSender`] posts the message as JSON to a
//! configurable delivery endpoint.

use crate::api::handlers::auth::{codes::SingleUseCode, state::AuthConfig, storage::UserRecord};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

#[derive(Clone, Debug, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

/// Email delivery abstraction used by the account operations.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email send stub"
        );
        Ok(())
    }
}

/// Sender that posts the message as JSON to an HTTP delivery endpoint.
#[derive(Clone, Debug)]
pub struct HttpEmailSender {
    client: Client,
    endpoint: Url,
}

impl HttpEmailSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build email HTTP client")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await
            .context("Failed to reach email endpoint")?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("email endpoint returned {}", response.status()))
        }
    }
}

fn build_link(frontend_base_url: &str, path: &str, code: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/{path}/{code}")
}

/// Render the activation email sent at registration and on resend.
pub(crate) fn activation_email(
    config: &AuthConfig,
    user: &UserRecord,
    code: &SingleUseCode,
) -> EmailMessage {
    let link = build_link(config.frontend_base_url(), "activate-account", &code.code);
    let subject = format!("Verify your {} account", config.app_name());
    let body_html = format!(
        "<p>Hi {firstname},</p>\
         <p>Welcome to {app}. Click the link below to activate your account. \
         The link expires in {hours} hour(s).</p>\
         <p><a href=\"{link}\">Activate your account</a></p>",
        firstname = user.firstname,
        app = config.app_name(),
        hours = code.ttl_hours(),
        link = link,
    );

    EmailMessage {
        from: config.email_from().to_string(),
        to: user.email.clone(),
        subject,
        body_html,
    }
}

/// Render the password reset email, including the requesting client context.
pub(crate) fn reset_email(
    config: &AuthConfig,
    user: &UserRecord,
    code: &SingleUseCode,
    client_context: Option<&str>,
) -> EmailMessage {
    let link = build_link(config.frontend_base_url(), "reset-password", &code.code);
    let subject = format!("Reset your {} password", config.app_name());
    let context_line = client_context.map_or_else(String::new, |context| {
        format!("<p>This request was made from: {context}</p>")
    });
    let body_html = format!(
        "<p>Hi {firstname},</p>\
         <p>We received a request to reset the password for {email}. \
         The link below expires in {hours} hour(s).</p>\
         <p><a href=\"{link}\">Reset your password</a></p>\
         {context_line}\
         <p>If you did not request this, you can ignore this email.</p>",
        firstname = user.firstname,
        email = user.email,
        hours = code.ttl_hours(),
        link = link,
        context_line = context_line,
    );

    EmailMessage {
        from: config.email_from().to_string(),
        to: user.email.clone(),
        subject,
        body_html,
    }
}
