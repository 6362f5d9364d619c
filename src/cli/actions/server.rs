use crate::api::{
    self,
    email::{EmailSender, HttpEmailSender, LogEmailSender},
    handlers::auth::{token::TokenSigner, AuthConfig, AuthState},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub cookie_max_age_seconds: i64,
    pub activation_ttl_hours: i64,
    pub resend_activation_ttl_hours: i64,
    pub reset_ttl_hours: i64,
    pub frontend_base_url: String,
    pub app_name: String,
    pub email_from: String,
    pub email_endpoint: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the email endpoint is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // The signing secret stays wrapped until the JWT keys are derived.
    let signer = TokenSigner::new(&args.token_secret, args.token_ttl_seconds);

    let sender: Arc<dyn EmailSender> = match &args.email_endpoint {
        Some(endpoint) => {
            let endpoint = Url::parse(endpoint)
                .with_context(|| format!("Invalid email endpoint: {endpoint}"))?;
            Arc::new(HttpEmailSender::new(endpoint)?)
        }
        None => Arc::new(LogEmailSender),
    };

    let config = AuthConfig::new(args.frontend_base_url)
        .with_app_name(args.app_name)
        .with_email_from(args.email_from)
        .with_cookie_max_age_seconds(args.cookie_max_age_seconds)
        .with_activation_ttl_hours(args.activation_ttl_hours)
        .with_resend_activation_ttl_hours(args.resend_activation_ttl_hours)
        .with_reset_ttl_hours(args.reset_ttl_hours);

    let state = Arc::new(AuthState::new(config, signer, sender));

    api::new(args.port, args.dsn, state).await
}
