//! Offline verifier: one account, salted SHA-256, stored in the session store.
//!
//! This offers no confidentiality. The digest and the salt both live on the
//! client that checks them. Use it for demos without a network.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use brewhouse_core::Email;

use super::password::{constant_time_eq, salted_digest};
use super::verifier::{Authenticated, CredentialVerifier, Registration};
use super::AuthError;
use crate::models::{Identity, StoredAccount, keys};
use crate::store::SessionStore;

/// Verifier backed by the single account under [`keys::USER`].
pub struct LocalVerifier {
    store: SessionStore,
    salt: SecretString,
}

impl LocalVerifier {
    #[must_use]
    pub const fn new(store: SessionStore, salt: SecretString) -> Self {
        Self { store, salt }
    }

    /// The stored account, if any.
    #[must_use]
    pub fn account(&self) -> Option<StoredAccount> {
        self.store.get(keys::USER)
    }
}

impl fmt::Debug for LocalVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalVerifier")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier for LocalVerifier {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn register(&self, registration: &Registration) -> Result<Authenticated, AuthError> {
        let email = &registration.profile.email;

        if self
            .account()
            .is_some_and(|existing| existing.identity.email.matches(email))
        {
            return Err(AuthError::UserAlreadyExists {
                email: email.redacted(),
            });
        }

        let account = StoredAccount {
            identity: Identity::from_profile(registration.profile.clone(), self.store.clock().now()),
            password_hash: salted_digest(
                registration.password.expose_secret(),
                self.salt.expose_secret(),
            ),
        };

        if !self.store.put(keys::USER, &account) {
            return Err(AuthError::StorageUnavailable);
        }

        tracing::debug!(email = %email.redacted(), "Stored local account");

        Ok(Authenticated {
            identity: account.redacted(),
            token: None,
        })
    }

    async fn verify(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Authenticated, AuthError> {
        let account = self
            .account()
            .filter(|account| account.identity.email.matches(email))
            .ok_or(AuthError::UserNotFound)?;

        let candidate = salted_digest(password.expose_secret(), self.salt.expose_secret());
        if !constant_time_eq(candidate.as_bytes(), account.password_hash.as_bytes()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Authenticated {
            identity: account.redacted(),
            token: None,
        })
    }
}
