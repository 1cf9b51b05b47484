//! Identity records held in the durable and ephemeral stores.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Marketplace role, fixed at registration.
#[derive(ToSchema, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Contractor,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Contractor => "contractor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "contractor" => Ok(Self::Contractor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Committed identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

/// Identity fields before the durable store assigns an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIdentity {
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

/// Registration staged in the ephemeral store until the code is confirmed.
///
/// Encoded as JSON; a malformed cache entry fails decoding instead of
/// surfacing as a half-populated record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIdentity {
    pub first_name: String,
    pub phone_number: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub code: String,
}

impl PendingIdentity {
    /// Encode for the ephemeral store.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a value read back from the ephemeral store.
    ///
    /// # Errors
    /// Returns an error if the payload is not a pending identity.
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Activation is the verification event: the committed copy is always active.
    #[must_use]
    pub fn into_active(self) -> NewIdentity {
        NewIdentity {
            first_name: self.first_name,
            email: self.email,
            phone_number: self.phone_number,
            password_hash: self.password_hash,
            role: self.role,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn pending() -> PendingIdentity {
        PendingIdentity {
            first_name: "Aziz".to_string(),
            phone_number: "+998901234567".to_string(),
            email: "aziz@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Contractor,
            is_active: false,
            code: "123456".to_string(),
        }
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Client".parse::<Role>(), Ok(Role::Client));
        assert_eq!(" contractor ".parse::<Role>(), Ok(Role::Contractor));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() -> Result<()> {
        assert_eq!(serde_json::to_string(&Role::Contractor)?, "\"contractor\"");
        Ok(())
    }

    #[test]
    fn pending_identity_decodes_what_it_encodes() -> Result<()> {
        let raw = pending().encode()?;
        assert!(raw.contains("\"role\":\"contractor\""));
        assert_eq!(PendingIdentity::decode(&raw)?, pending());
        Ok(())
    }

    #[test]
    fn pending_identity_rejects_untyped_payload() {
        assert!(PendingIdentity::decode(r#"{"first_name":1}"#).is_err());
        assert!(PendingIdentity::decode("123456").is_err());
    }

    #[test]
    fn into_active_sets_active_flag() {
        let identity = pending().into_active();
        assert!(identity.is_active);
        assert_eq!(identity.phone_number, "+998901234567");
    }
}
