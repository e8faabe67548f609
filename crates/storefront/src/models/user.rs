//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brewhouse_core::{Email, PasswordDigest, PersonName, Phone, Profile, StreetAddress, UserId};

/// A customer identity, as handed to callers.
///
/// Never carries a password or digest; this is the redacted form of
/// [`StoredAccount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub address: StreetAddress,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Build a new identity with a fresh random id.
    #[must_use]
    pub fn from_profile(profile: Profile, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::generate(),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
            created_at,
        }
    }
}

/// The single account persisted by the offline verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAccount {
    #[serde(flatten)]
    pub identity: Identity,
    pub password_hash: PasswordDigest,
}

impl StoredAccount {
    /// Drop the digest.
    #[must_use]
    pub fn redacted(&self) -> Identity {
        self.identity.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account() -> StoredAccount {
        let profile =
            Profile::parse("Ana Silva", "ana@x.com", "(11) 91234-5678", "Rua A, 100, SP").unwrap();
        StoredAccount {
            identity: Identity::from_profile(profile, Utc::now()),
            password_hash: PasswordDigest::new("ab".repeat(32)),
        }
    }

    #[test]
    fn test_account_serializes_flat_camel_case() {
        let json = serde_json::to_value(account()).unwrap();
        assert_eq!(json["email"], "ana@x.com");
        assert!(json.get("passwordHash").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_redacted_identity_has_no_hash() {
        let json = serde_json::to_value(account().redacted()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["name"], "Ana Silva");
    }
}
