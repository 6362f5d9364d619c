//! Auth configuration and shared state.

use crate::api::email::EmailSender;
use crate::api::handlers::auth::token::TokenSigner;
use std::sync::Arc;

const DEFAULT_COOKIE_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_ACTIVATION_TTL_HOURS: i64 = 24;
const DEFAULT_RESEND_ACTIVATION_TTL_HOURS: i64 = 1;
const DEFAULT_RESET_TTL_HOURS: i64 = 1;
const DEFAULT_APP_NAME: &str = "Konto";
const DEFAULT_EMAIL_FROM: &str = "Konto <activation@konto.dev>";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    app_name: String,
    email_from: String,
    cookie_max_age_seconds: i64,
    activation_ttl_hours: i64,
    resend_activation_ttl_hours: i64,
    reset_ttl_hours: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            app_name: DEFAULT_APP_NAME.to_string(),
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            cookie_max_age_seconds: DEFAULT_COOKIE_MAX_AGE_SECONDS,
            activation_ttl_hours: DEFAULT_ACTIVATION_TTL_HOURS,
            resend_activation_ttl_hours: DEFAULT_RESEND_ACTIVATION_TTL_HOURS,
            reset_ttl_hours: DEFAULT_RESET_TTL_HOURS,
        }
    }

    #[must_use]
    pub fn with_app_name(mut self, app_name: String) -> Self {
        self.app_name = app_name;
        self
    }

    #[must_use]
    pub fn with_email_from(mut self, email_from: String) -> Self {
        self.email_from = email_from;
        self
    }

    #[must_use]
    pub fn with_cookie_max_age_seconds(mut self, seconds: i64) -> Self {
        self.cookie_max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_activation_ttl_hours(mut self, hours: i64) -> Self {
        self.activation_ttl_hours = hours;
        self
    }

    #[must_use]
    pub fn with_resend_activation_ttl_hours(mut self, hours: i64) -> Self {
        self.resend_activation_ttl_hours = hours;
        self
    }

    #[must_use]
    pub fn with_reset_ttl_hours(mut self, hours: i64) -> Self {
        self.reset_ttl_hours = hours;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(crate) fn app_name(&self) -> &str {
        &self.app_name
    }

    pub(crate) fn email_from(&self) -> &str {
        &self.email_from
    }

    pub(crate) fn cookie_max_age_seconds(&self) -> i64 {
        self.cookie_max_age_seconds
    }

    pub(crate) fn activation_ttl_hours(&self) -> i64 {
        self.activation_ttl_hours
    }

    pub(crate) fn resend_activation_ttl_hours(&self) -> i64 {
        self.resend_activation_ttl_hours
    }

    pub(crate) fn reset_ttl_hours(&self) -> i64 {
        self.reset_ttl_hours
    }
}

pub struct AuthState {
    config: AuthConfig,
    signer: TokenSigner,
    sender: Arc<dyn EmailSender>,
}

impl AuthState {
    pub fn new(config: AuthConfig, signer: TokenSigner, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            config,
            signer,
            sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub(crate) fn sender(&self) -> &dyn EmailSender {
        self.sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use secrecy::SecretString;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://konto.dev".to_string());

        assert_eq!(config.frontend_base_url(), "https://konto.dev");
        assert_eq!(config.app_name(), DEFAULT_APP_NAME);
        assert_eq!(config.email_from(), DEFAULT_EMAIL_FROM);
        assert_eq!(
            config.cookie_max_age_seconds(),
            DEFAULT_COOKIE_MAX_AGE_SECONDS
        );
        assert_eq!(config.activation_ttl_hours(), DEFAULT_ACTIVATION_TTL_HOURS);
        assert_eq!(
            config.resend_activation_ttl_hours(),
            DEFAULT_RESEND_ACTIVATION_TTL_HOURS
        );
        assert_eq!(config.reset_ttl_hours(), DEFAULT_RESET_TTL_HOURS);

        let config = config
            .with_app_name("Accounts".to_string())
            .with_email_from("Accounts <noreply@accounts.test>".to_string())
            .with_cookie_max_age_seconds(120)
            .with_activation_ttl_hours(48)
            .with_resend_activation_ttl_hours(2)
            .with_reset_ttl_hours(3);

        assert_eq!(config.app_name(), "Accounts");
        assert_eq!(config.email_from(), "Accounts <noreply@accounts.test>");
        assert_eq!(config.cookie_max_age_seconds(), 120);
        assert_eq!(config.activation_ttl_hours(), 48);
        assert_eq!(config.resend_activation_ttl_hours(), 2);
        assert_eq!(config.reset_ttl_hours(), 3);
    }

    #[test]
    fn auth_state_exposes_its_parts() {
        let config = AuthConfig::new("https://konto.dev".to_string());
        let signer = TokenSigner::new(&SecretString::from("test-signing-secret"), 3600);
        let state = AuthState::new(config, signer, Arc::new(LogEmailSender));
        assert_eq!(state.config().frontend_base_url(), "https://konto.dev");
        assert_eq!(state.signer().ttl_seconds(), 3600);
    }
}
