//! Outbound notification channel for one-time codes.
//!
//! The identity flows only know the [`Notifier`] trait. `LogNotifier` is the
//! default for local runs and logs the message instead of delivering it;
//! `HttpNotifier` posts a JSON envelope to a mail relay.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, info_span, Instrument};
use url::Url;

use crate::APP_USER_AGENT;

/// Delivery abstraction used by the identity flows.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message or return an error so the caller can fail the request.
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        info!(to_email = %address, subject = %subject, body = %body, "email send stub");
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts `{from, to, subject, body}` to a mail relay endpoint.
#[derive(Clone, Debug)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: Url,
    from: String,
}

impl HttpNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url, from: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build mail relay client")?;
        Ok(Self {
            client,
            endpoint,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        let message = RelayMessage {
            from: &self.from,
            to: address,
            subject,
            body,
        };
        let span = info_span!("mail.relay", http.url = %self.endpoint);
        self.client
            .post(self.endpoint.clone())
            .json(&message)
            .send()
            .instrument(span)
            .await
            .context("Failed to reach mail relay")?
            .error_for_status()
            .context("Mail relay rejected message")?;
        Ok(())
    }
}
