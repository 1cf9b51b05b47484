//! Session token issuance and validation (HS256).
//!
//! The signing key is handed to [`TokenService::new`] by whoever builds the
//! service; nothing here reads process-wide configuration.

use anyhow::{Context, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::debug;

use super::models::Role;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 48 * 60 * 60;

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub role: Role,
    pub iat: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token expiring `ttl` from now.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue(&self, email: &str, role: Role) -> Result<String> {
        self.issue_at(email, role, now_unix_seconds())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds).
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue_at(&self, email: &str, role: Role, issued_at: i64) -> Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            email: email.to_string(),
            role,
            iat: issued_at,
            expires_at: issued_at.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign session token")
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    /// [`TokenError::Expired`] once `exp` has passed, [`TokenError::Invalid`]
    /// for any signature, algorithm or format problem.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        match decode::<SessionClaims>(token.trim(), &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                Err(TokenError::Expired)
            }
            Err(err) => {
                debug!("session token rejected: {err}");
                Err(TokenError::Invalid)
            }
        }
    }
}

/// Unix seconds for token timestamps.
fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            &SecretString::from(secret.to_string()),
            Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
        )
    }

    #[test]
    fn issued_token_validates() -> Result<()> {
        let tokens = service("signing-key");
        let token = tokens.issue("aziz@example.com", Role::Client)?;
        let claims = tokens.validate(&token)?;
        assert_eq!(claims.email, "aziz@example.com");
        assert_eq!(claims.role, Role::Client);
        assert_eq!(
            claims.expires_at - claims.iat,
            i64::try_from(DEFAULT_SESSION_TTL_SECONDS)?
        );
        Ok(())
    }

    #[test]
    fn token_past_expiry_is_expired() -> Result<()> {
        let tokens = service("signing-key");
        let ttl = i64::try_from(DEFAULT_SESSION_TTL_SECONDS)?;
        let issued_at = now_unix_seconds() - ttl - 1;
        let token = tokens.issue_at("aziz@example.com", Role::Client, issued_at)?;
        assert_eq!(tokens.validate(&token), Err(TokenError::Expired));
        Ok(())
    }

    #[test]
    fn altered_signature_is_invalid() -> Result<()> {
        let tokens = service("signing-key");
        let token = tokens.issue("aziz@example.com", Role::Contractor)?;
        let (unsigned, signature) = token.rsplit_once('.').ok_or_else(|| anyhow::anyhow!("no signature"))?;
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{unsigned}.{flipped}{}", &signature[1..]);
        assert_eq!(tokens.validate(&tampered), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn expired_token_with_bad_signature_is_invalid() -> Result<()> {
        let issuer = service("other-key");
        let issued_at = now_unix_seconds() - 3 * i64::try_from(DEFAULT_SESSION_TTL_SECONDS)?;
        let token = issuer.issue_at("aziz@example.com", Role::Client, issued_at)?;
        assert_eq!(service("signing-key").validate(&token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service("signing-key");
        assert_eq!(tokens.validate(""), Err(TokenError::Invalid));
        assert_eq!(tokens.validate("not.a.jwt"), Err(TokenError::Invalid));
    }
}
