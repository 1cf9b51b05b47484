//! Outbound email arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_EMAIL_RELAY_URL: &str = "email-relay-url";
pub const ARG_EMAIL_FROM: &str = "email-from";

#[derive(Debug)]
pub struct Options {
    pub relay_url: Option<Url>,
    pub from: String,
}

impl Options {
    /// Parse email arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the relay URL is not a valid URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let relay_url = matches
            .get_one::<String>(ARG_EMAIL_RELAY_URL)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| {
                Url::parse(value).with_context(|| format!("Invalid --{ARG_EMAIL_RELAY_URL}: {value}"))
            })
            .transpose()?;
        let from = matches
            .get_one::<String>(ARG_EMAIL_FROM)
            .cloned()
            .unwrap_or_default();

        Ok(Self { relay_url, from })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL_RELAY_URL)
                .long(ARG_EMAIL_RELAY_URL)
                .help("HTTP mail relay endpoint; codes are only logged when unset")
                .env("TENDERGATE_EMAIL_RELAY_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("Sender address for outbound codes")
                .env("TENDERGATE_EMAIL_FROM")
                .default_value("no-reply@tendergate.dev"),
        )
}
