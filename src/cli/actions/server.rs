use crate::{
    api::{self, handlers::auth::AuthState},
    cli::telemetry,
    email::{HttpNotifier, LogNotifier, Notifier},
    identity::{IdentityConfig, IdentityService, PolicyEnforcer, PolicyTable, TokenService},
    store::{PgIdentityStore, RedisEphemeralStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub redis_url: String,
    pub token_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub code_ttl_seconds: u64,
    pub phone_country_code: String,
    pub otp_bypass_code: Option<String>,
    pub policy_path: Option<PathBuf>,
    pub email_relay_url: Option<Url>,
    pub email_from: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a backing store is unreachable, the policy cannot be
/// loaded, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;
    info!("connected to database");

    let ephemeral = RedisEphemeralStore::connect(&args.redis_url).await?;
    info!("connected to redis");

    let policy = match &args.policy_path {
        Some(path) => PolicyTable::load(path)?,
        None => PolicyTable::builtin()?,
    };
    let policy: Arc<dyn PolicyEnforcer> = Arc::new(policy);

    let notifier: Arc<dyn Notifier> = match args.email_relay_url {
        Some(url) => Arc::new(HttpNotifier::new(url, args.email_from)?),
        None => {
            warn!("no email relay configured, verification codes will only be logged");
            Arc::new(LogNotifier)
        }
    };

    if args.otp_bypass_code.is_some() {
        warn!("OTP bypass code is enabled, every verification accepts it");
    }

    let config = IdentityConfig::new()
        .with_code_ttl_seconds(args.code_ttl_seconds)
        .with_country_code(args.phone_country_code)
        .with_otp_bypass_code(args.otp_bypass_code);
    let tokens = TokenService::new(
        &args.token_secret,
        Duration::from_secs(args.session_ttl_seconds),
    );

    let service = IdentityService::new(
        Arc::new(ephemeral),
        Arc::new(PgIdentityStore::new(pool)),
        notifier,
        tokens,
        config,
    );
    let auth_state = Arc::new(AuthState::new(service, policy));

    let result = api::new(args.port, auth_state).await;

    telemetry::shutdown_tracer();

    result
}
