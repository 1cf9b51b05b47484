//! Registration, login and password-reset flows.
//!
//! Every flow that leaves a "pending" state requires a matching one-time code.
//! Pending registrations and reset codes live only in the ephemeral store;
//! the durable store sees an identity only after its code was confirmed.

use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument, warn};

use super::{
    code::{codes_match, generate_code, generate_reset_token, hash_reset_token, CODE_LENGTH},
    credentials::{hash_password, verify_password, verify_password_or_dummy},
    error::AuthError,
    models::{Identity, PendingIdentity, Role},
    token::TokenService,
    validation::{
        is_valid_phone_number, normalize_email, valid_email, validate_password,
        DEFAULT_COUNTRY_CODE,
    },
};
use crate::{
    email::Notifier,
    store::{cache_key, EphemeralStore, IdentityStore, REGISTER_PREFIX, RESET_GRANT_PREFIX, RESET_PREFIX},
};

pub const DEFAULT_CODE_TTL_SECONDS: u64 = 3 * 60;

const CODE_NOT_FOUND: &str = "Verification code not found or expired";
const WRONG_CODE: &str = "Wrong OTP code, please try again";

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    code_ttl: Duration,
    country_code: String,
    otp_bypass_code: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityConfig {
    /// 3 minute codes, `+998` numbers, no bypass code.
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl: Duration::from_secs(DEFAULT_CODE_TTL_SECONDS),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            otp_bypass_code: None,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: u64) -> Self {
        self.code_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into().trim_start_matches('+').to_string();
        self
    }

    /// Accept `code` for every verification. Test environments only.
    #[must_use]
    pub fn with_otp_bypass_code(mut self, code: Option<String>) -> Self {
        self.otp_bypass_code = code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        self
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        self.code_ttl
    }

    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    #[must_use]
    pub fn otp_bypass_code(&self) -> Option<&str> {
        self.otp_bypass_code.as_deref()
    }
}

/// Input of the first registration phase.
#[derive(Clone, Debug)]
pub struct Registration {
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub role: Role,
}

/// Returned when a code was staged and sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTicket {
    pub phone_number: String,
    pub expires_in: Duration,
}

/// Single-use permission to set a new password without the current one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetGrant {
    pub user_id: i64,
    pub reset_token: String,
}

pub struct IdentityService {
    ephemeral: Arc<dyn EphemeralStore>,
    identities: Arc<dyn IdentityStore>,
    notifier: Arc<dyn Notifier>,
    tokens: TokenService,
    config: IdentityConfig,
}

impl IdentityService {
    #[must_use]
    pub fn new(
        ephemeral: Arc<dyn EphemeralStore>,
        identities: Arc<dyn IdentityStore>,
        notifier: Arc<dyn Notifier>,
        tokens: TokenService,
        config: IdentityConfig,
    ) -> Self {
        Self {
            ephemeral,
            identities,
            notifier,
            tokens,
            config,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    #[must_use]
    pub fn ephemeral(&self) -> &Arc<dyn EphemeralStore> {
        &self.ephemeral
    }

    #[must_use]
    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        &self.identities
    }

    fn check_phone(&self, phone_number: &str) -> Result<(), AuthError> {
        if is_valid_phone_number(phone_number, self.config.country_code()) {
            Ok(())
        } else {
            Err(AuthError::validation(format!(
                "Invalid phone number format. Must start with +{} and be followed by 9 digits",
                self.config.country_code()
            )))
        }
    }

    async fn send_code(&self, address: &str, subject: &str, code: &str) -> Result<(), AuthError> {
        let minutes = self.config.code_ttl.as_secs().div_ceil(60);
        let body = format!("Your verification code is: {code}\nIt expires in {minutes} minute(s).");
        self.notifier
            .send(address, subject, &body)
            .await
            .context("Failed to send verification code")?;
        Ok(())
    }

    /// Consumed keys are removed best-effort; they expire on their own.
    async fn discard(&self, key: &str) {
        if let Err(err) = self.ephemeral.delete(key).await {
            warn!("Failed to delete cache key {key}: {err}");
        }
    }

    async fn find_active(&self, user_id: i64) -> Result<Identity, AuthError> {
        self.identities
            .find_by_id(user_id)
            .await?
            .filter(|identity| identity.is_active)
            .ok_or(AuthError::NotFound("User not found"))
    }

    /// Validate, hash and stage a registration, then send its code.
    ///
    /// A second request for the same phone number replaces the staged entry.
    ///
    /// # Errors
    /// [`AuthError::Validation`] for bad input, [`AuthError::Internal`] when
    /// hashing, caching or delivery fails.
    #[instrument(skip_all, fields(phone_number = %registration.phone_number, role = %registration.role))]
    pub async fn request_registration(&self, registration: Registration) -> Result<CodeTicket, AuthError> {
        let first_name = registration.first_name.trim();
        if first_name.is_empty() {
            return Err(AuthError::validation("First name is required"));
        }
        let phone_number = registration.phone_number.trim();
        self.check_phone(phone_number)?;
        let email = normalize_email(&registration.email);
        if !valid_email(&email) {
            return Err(AuthError::validation("Invalid email format"));
        }
        validate_password(&registration.password).map_err(AuthError::Validation)?;

        let password_hash = hash_password(&registration.password)?;
        let code = generate_code(CODE_LENGTH);
        let pending = PendingIdentity {
            first_name: first_name.to_string(),
            phone_number: phone_number.to_string(),
            email: email.clone(),
            password_hash,
            role: registration.role,
            is_active: false,
            code: code.clone(),
        };
        let encoded = pending.encode().context("Failed to encode pending registration")?;

        self.ephemeral
            .set_with_ttl(
                &cache_key(REGISTER_PREFIX, phone_number),
                &encoded,
                self.config.code_ttl,
            )
            .await?;
        self.send_code(&email, "Registration verification code", &code)
            .await?;

        info!("registration staged");
        Ok(CodeTicket {
            phone_number: phone_number.to_string(),
            expires_in: self.config.code_ttl,
        })
    }

    /// Confirm a staged registration and commit the identity as active.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] when nothing is staged (or it expired),
    /// [`AuthError::Validation`] on a wrong code, [`AuthError::Conflict`] when
    /// the email or phone is already registered. The staged entry survives
    /// every failure.
    #[instrument(skip(self, code))]
    pub async fn verify_registration(&self, phone_number: &str, code: &str) -> Result<Identity, AuthError> {
        let key = cache_key(REGISTER_PREFIX, phone_number.trim());
        let raw = self
            .ephemeral
            .get(&key)
            .await?
            .ok_or(AuthError::NotFound(CODE_NOT_FOUND))?;
        let pending = PendingIdentity::decode(&raw).context("Malformed pending registration")?;

        if !codes_match(&pending.code, code, self.config.otp_bypass_code()) {
            return Err(AuthError::validation(WRONG_CODE));
        }

        let identity = self.identities.insert(pending.into_active()).await?;
        self.discard(&key).await;

        info!(user_id = identity.id, "identity activated");
        Ok(identity)
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] for unknown emails, [`AuthError::Unauthorized`]
    /// for inactive accounts and wrong passwords.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let identity = self.identities.find_by_email(&email).await?;

        // Unknown accounts pay for a verification too.
        let password_ok = verify_password_or_dummy(
            password,
            identity.as_ref().map(|identity| identity.password_hash.as_str()),
        );
        let identity = identity.ok_or(AuthError::NotFound("User not found"))?;

        if !identity.is_active {
            return Err(AuthError::Unauthorized("User is not verified yet"));
        }
        if !password_ok {
            return Err(AuthError::Unauthorized("Invalid email or password"));
        }

        let token = self.tokens.issue(&identity.email, identity.role)?;
        info!(user_id = identity.id, "session issued");
        Ok(token)
    }

    /// Replace the password of an active identity that knows its current one.
    ///
    /// # Errors
    /// [`AuthError::NotFound`], [`AuthError::Unauthorized`] on a wrong current
    /// password, [`AuthError::Validation`] when the new one fails the policy.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn reset_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut identity = self.find_active(user_id).await?;
        if !verify_password(current_password, &identity.password_hash) {
            return Err(AuthError::Unauthorized("Invalid password"));
        }
        validate_password(new_password).map_err(AuthError::Validation)?;

        identity.password_hash = hash_password(new_password)?;
        self.identities.save(&identity).await?;
        info!("password reset");
        Ok(())
    }

    /// Send a reset code to the email of the identity owning `phone_number`.
    ///
    /// # Errors
    /// [`AuthError::Validation`] for a malformed phone, [`AuthError::NotFound`]
    /// when no identity uses it.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, phone_number: &str) -> Result<CodeTicket, AuthError> {
        let phone_number = phone_number.trim();
        self.check_phone(phone_number)?;
        let identity = self
            .identities
            .find_by_phone(phone_number)
            .await?
            .ok_or(AuthError::NotFound("User not found with this phone number"))?;

        let code = generate_code(CODE_LENGTH);
        self.ephemeral
            .set_with_ttl(
                &cache_key(RESET_PREFIX, phone_number),
                &code,
                self.config.code_ttl,
            )
            .await?;
        self.send_code(&identity.email, "Password reset verification code", &code)
            .await?;

        info!(user_id = identity.id, "reset code staged");
        Ok(CodeTicket {
            phone_number: phone_number.to_string(),
            expires_in: self.config.code_ttl,
        })
    }

    /// Consume a reset code and hand out a single-use reset grant.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] when no code is staged, [`AuthError::Validation`]
    /// on a wrong code.
    #[instrument(skip(self, code))]
    pub async fn verify_forgot_password(&self, phone_number: &str, code: &str) -> Result<ResetGrant, AuthError> {
        let phone_number = phone_number.trim();
        let key = cache_key(RESET_PREFIX, phone_number);
        let issued = self
            .ephemeral
            .get(&key)
            .await?
            .ok_or(AuthError::NotFound(CODE_NOT_FOUND))?;

        if !codes_match(&issued, code, self.config.otp_bypass_code()) {
            return Err(AuthError::validation(WRONG_CODE));
        }

        let identity = self
            .identities
            .find_by_phone(phone_number)
            .await?
            .ok_or(AuthError::NotFound("User not found with this phone number"))?;
        self.discard(&key).await;

        let reset_token = generate_reset_token();
        self.ephemeral
            .set_with_ttl(
                &cache_key(RESET_GRANT_PREFIX, &identity.id.to_string()),
                &hash_reset_token(&reset_token),
                self.config.code_ttl,
            )
            .await?;

        info!(user_id = identity.id, "reset grant issued");
        Ok(ResetGrant {
            user_id: identity.id,
            reset_token,
        })
    }

    /// Set a new password using a reset grant. The grant is consumed.
    ///
    /// # Errors
    /// [`AuthError::Validation`] when the password fails the policy,
    /// [`AuthError::Unauthorized`] without a matching grant,
    /// [`AuthError::NotFound`] when the identity is gone or inactive.
    #[instrument(skip(self, reset_token, new_password))]
    pub async fn set_new_password(
        &self,
        user_id: i64,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password).map_err(AuthError::Validation)?;

        let key = cache_key(RESET_GRANT_PREFIX, &user_id.to_string());
        let granted = self.ephemeral.get(&key).await?;
        if granted.as_deref() != Some(hash_reset_token(reset_token.trim()).as_str()) {
            return Err(AuthError::Unauthorized("Reset grant missing or expired"));
        }

        let mut identity = self.find_active(user_id).await?;
        identity.password_hash = hash_password(new_password)?;
        self.identities.save(&identity).await?;
        self.discard(&key).await;

        info!("forgotten password replaced");
        Ok(())
    }
}
