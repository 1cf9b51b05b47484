//! Token, one-time code and policy arguments.

use anyhow::{bail, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

use crate::identity::{service::DEFAULT_CODE_TTL_SECONDS, token::DEFAULT_SESSION_TTL_SECONDS, validation::DEFAULT_COUNTRY_CODE};

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_CODE_TTL_SECONDS: &str = "code-ttl-seconds";
pub const ARG_PHONE_COUNTRY_CODE: &str = "phone-country-code";
pub const ARG_OTP_BYPASS_CODE: &str = "otp-bypass-code";
pub const ARG_POLICY_PATH: &str = "policy-path";

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub code_ttl_seconds: u64,
    pub phone_country_code: String,
    pub otp_bypass_code: Option<String>,
    pub policy_path: Option<PathBuf>,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing key is missing or a TTL is zero.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = match matches.get_one::<String>(ARG_TOKEN_SECRET) {
            Some(secret) if !secret.trim().is_empty() => SecretString::from(secret.clone()),
            _ => bail!("missing required argument: --{ARG_TOKEN_SECRET}"),
        };

        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);
        let code_ttl_seconds = matches
            .get_one::<u64>(ARG_CODE_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_CODE_TTL_SECONDS);
        if session_ttl_seconds == 0 || code_ttl_seconds == 0 {
            bail!("--{ARG_SESSION_TTL_SECONDS} and --{ARG_CODE_TTL_SECONDS} must be greater than zero");
        }

        let phone_country_code = matches
            .get_one::<String>(ARG_PHONE_COUNTRY_CODE)
            .map_or(DEFAULT_COUNTRY_CODE, String::as_str)
            .trim()
            .trim_start_matches('+')
            .to_string();
        if phone_country_code.is_empty() || !phone_country_code.chars().all(|c| c.is_ascii_digit()) {
            bail!("--{ARG_PHONE_COUNTRY_CODE} must be digits, got: {phone_country_code}");
        }

        // clap passes empty env values through; treat them as unset.
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            token_secret,
            session_ttl_seconds,
            code_ttl_seconds,
            phone_country_code,
            otp_bypass_code: get_non_empty(ARG_OTP_BYPASS_CODE),
            policy_path: get_non_empty(ARG_POLICY_PATH).map(PathBuf::from),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("HMAC key used to sign session tokens")
                .env("TENDERGATE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("TENDERGATE_SESSION_TTL_SECONDS")
                .default_value("172800")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_CODE_TTL_SECONDS)
                .long(ARG_CODE_TTL_SECONDS)
                .help("Lifetime of registration and reset codes in seconds")
                .env("TENDERGATE_CODE_TTL_SECONDS")
                .default_value("180")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_PHONE_COUNTRY_CODE)
                .long(ARG_PHONE_COUNTRY_CODE)
                .help("Accepted phone country code, numbers must be +<code> followed by 9 digits")
                .env("TENDERGATE_PHONE_COUNTRY_CODE")
                .default_value(DEFAULT_COUNTRY_CODE),
        )
        .arg(
            Arg::new(ARG_OTP_BYPASS_CODE)
                .long(ARG_OTP_BYPASS_CODE)
                .help("Code accepted for every verification (test environments only)")
                .env("TENDERGATE_OTP_BYPASS_CODE")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_POLICY_PATH)
                .long(ARG_POLICY_PATH)
                .help("Policy CSV file (p, <role>, <path>, <method>[, allow|deny]); built-in policy when unset")
                .env("TENDERGATE_POLICY_PATH"),
        )
}
