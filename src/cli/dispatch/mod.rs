//! Map validated CLI matches to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, email, ARG_DSN, ARG_PORT, ARG_REDIS_URL};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let redis_url = matches
        .get_one::<String>(ARG_REDIS_URL)
        .cloned()
        .context("missing required argument: --redis-url")?;

    let auth_opts = auth::Options::parse(matches)?;
    let email_opts = email::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        redis_url,
        token_secret: auth_opts.token_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        code_ttl_seconds: auth_opts.code_ttl_seconds,
        phone_country_code: auth_opts.phone_country_code,
        otp_bypass_code: auth_opts.otp_bypass_code,
        policy_path: auth_opts.policy_path,
        email_relay_url: email_opts.relay_url,
        email_from: email_opts.from,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const DSN: &str = "postgres://user@localhost:5432/tendergate";

    fn server_args(vars: Vec<(&str, Option<&str>)>) -> Result<Args> {
        temp_env::with_vars(vars, || {
            let matches = crate::cli::commands::new()
                .try_get_matches_from(vec!["tendergate"])
                .map_err(|err| anyhow::anyhow!(err.to_string()))?;
            match handler(&matches)? {
                Action::Server(args) => Ok(args),
            }
        })
    }

    #[test]
    fn server_action_from_env() -> Result<()> {
        let args = server_args(vec![
            ("TENDERGATE_DSN", Some(DSN)),
            ("TENDERGATE_TOKEN_SECRET", Some("signing-key")),
            ("TENDERGATE_PHONE_COUNTRY_CODE", Some("+998")),
            ("TENDERGATE_OTP_BYPASS_CODE", Some("")),
            ("TENDERGATE_EMAIL_RELAY_URL", Some("http://relay.local/send")),
            ("TENDERGATE_POLICY_PATH", None),
            ("TENDERGATE_CODE_TTL_SECONDS", None),
        ])?;

        assert_eq!(args.dsn, DSN);
        assert_eq!(args.token_secret.expose_secret(), "signing-key");
        assert_eq!(args.phone_country_code, "998");
        assert_eq!(args.code_ttl_seconds, 180);
        assert!(args.otp_bypass_code.is_none());
        assert!(args.policy_path.is_none());
        assert_eq!(
            args.email_relay_url.as_ref().map(url::Url::as_str),
            Some("http://relay.local/send")
        );
        Ok(())
    }

    #[test]
    fn zero_code_ttl_is_rejected() {
        let result = server_args(vec![
            ("TENDERGATE_DSN", Some(DSN)),
            ("TENDERGATE_TOKEN_SECRET", Some("signing-key")),
            ("TENDERGATE_CODE_TTL_SECONDS", Some("0")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn blank_token_secret_is_rejected() {
        let result = server_args(vec![
            ("TENDERGATE_DSN", Some(DSN)),
            ("TENDERGATE_TOKEN_SECRET", Some("   ")),
        ]);
        assert!(result.is_err_and(|err| err.to_string().contains("--token-secret")));
    }

    #[test]
    fn invalid_relay_url_is_rejected() {
        let result = server_args(vec![
            ("TENDERGATE_DSN", Some(DSN)),
            ("TENDERGATE_TOKEN_SECRET", Some("signing-key")),
            ("TENDERGATE_EMAIL_RELAY_URL", Some("not a url")),
        ]);
        assert!(result.is_err());
    }
}
