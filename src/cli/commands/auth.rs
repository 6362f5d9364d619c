use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    let command = with_code_args(command);
    with_email_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("token-ttl-seconds")
                .long("token-ttl-seconds")
                .help("Session token TTL in seconds")
                .env("KONTO_TOKEN_TTL_SECONDS")
                .default_value("72000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("cookie-max-age-seconds")
                .long("cookie-max-age-seconds")
                .help("AUTH-TOKEN cookie max-age in seconds")
                .env("KONTO_COOKIE_MAX_AGE_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
}

fn with_code_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("activation-ttl-hours")
                .long("activation-ttl-hours")
                .help("Activation code TTL for new registrations in hours")
                .env("KONTO_ACTIVATION_TTL_HOURS")
                .default_value("24")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("resend-activation-ttl-hours")
                .long("resend-activation-ttl-hours")
                .help("Activation code TTL when resending in hours")
                .env("KONTO_RESEND_ACTIVATION_TTL_HOURS")
                .default_value("1")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("reset-ttl-hours")
                .long("reset-ttl-hours")
                .help("Password reset code TTL in hours")
                .env("KONTO_RESET_TTL_HOURS")
                .default_value("1")
                .value_parser(clap::value_parser!(i64)),
        )
}

fn with_email_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL used for activation and reset links")
                .env("KONTO_FRONTEND_BASE_URL")
                .default_value("https://konto.dev"),
        )
        .arg(
            Arg::new("app-name")
                .long("app-name")
                .help("Application name used in email subjects")
                .env("KONTO_APP_NAME")
                .default_value("Konto"),
        )
        .arg(
            Arg::new("email-from")
                .long("email-from")
                .help("From address for outbound account emails")
                .env("KONTO_EMAIL_FROM")
                .default_value("Konto <activation@konto.dev>"),
        )
        .arg(
            Arg::new("email-endpoint")
                .long("email-endpoint")
                .help("HTTP email delivery endpoint; emails are logged when unset")
                .env("KONTO_EMAIL_ENDPOINT"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_ttls() {
        let command = with_args(Command::new("konto"));
        let matches = command.get_matches_from(vec!["konto"]);

        assert_eq!(
            matches.get_one::<i64>("token-ttl-seconds").copied(),
            Some(72_000)
        );
        assert_eq!(
            matches.get_one::<i64>("cookie-max-age-seconds").copied(),
            Some(604_800)
        );
        assert_eq!(
            matches.get_one::<i64>("activation-ttl-hours").copied(),
            Some(24)
        );
        assert_eq!(
            matches
                .get_one::<i64>("resend-activation-ttl-hours")
                .copied(),
            Some(1)
        );
        assert_eq!(matches.get_one::<i64>("reset-ttl-hours").copied(), Some(1));
        assert_eq!(
            matches.get_one::<String>("email-endpoint").cloned(),
            None::<String>
        );
    }

    #[test]
    fn email_args_from_env() {
        temp_env::with_vars(
            [
                ("KONTO_EMAIL_FROM", Some("Accounts <noreply@accounts.test>")),
                ("KONTO_EMAIL_ENDPOINT", Some("https://mail.test/send")),
                ("KONTO_APP_NAME", Some("Accounts")),
            ],
            || {
                let command = with_args(Command::new("konto"));
                let matches = command.get_matches_from(vec!["konto"]);
                assert_eq!(
                    matches.get_one::<String>("email-from").cloned(),
                    Some("Accounts <noreply@accounts.test>".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("email-endpoint").cloned(),
                    Some("https://mail.test/send".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("app-name").cloned(),
                    Some("Accounts".to_string())
                );
            },
        );
    }
}
