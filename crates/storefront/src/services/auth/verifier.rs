//! The credential-checking capability behind [`AuthGuard`](super::AuthGuard).
//!
//! Two implementations exist: [`RemoteVerifier`] talks to the auth API and is
//! the normal choice; [`LocalVerifier`] keeps a single salted-digest account
//! in the session store for offline demos. [`AnyVerifier`] picks one at
//! runtime from configuration.

use std::future::Future;

use secrecy::SecretString;

use brewhouse_core::{Email, Profile, SessionToken};

use super::local::LocalVerifier;
use super::remote::RemoteVerifier;
use super::AuthError;
use crate::config::AuthBackend;
use crate::models::Identity;
use crate::store::SessionStore;

/// A validated registration.
#[derive(Debug)]
pub struct Registration {
    pub profile: Profile,
    pub password: SecretString,
}

/// Outcome of a successful register or verify call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub identity: Identity,
    /// Session token, when the verifier issues one.
    pub token: Option<SessionToken>,
}

/// Creates accounts and checks passwords.
pub trait CredentialVerifier: Send + Sync {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserAlreadyExists`] for a duplicate email, or a
    /// storage/transport error.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<Authenticated, AuthError>> + Send;

    /// Check a password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] or [`AuthError::InvalidCredentials`]
    /// when the credentials are wrong, or a storage/transport error.
    fn verify(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<Authenticated, AuthError>> + Send;
}

/// Either verifier, chosen at runtime.
#[derive(Debug)]
pub enum AnyVerifier {
    Local(LocalVerifier),
    Remote(RemoteVerifier),
}

impl AnyVerifier {
    /// Build the verifier a configured backend names. The local verifier
    /// keeps its account in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Http`] if the HTTP client cannot be built.
    pub fn from_backend(backend: &AuthBackend, store: SessionStore) -> Result<Self, AuthError> {
        Ok(match backend {
            AuthBackend::Remote(endpoint) => RemoteVerifier::new(endpoint.clone())?.into(),
            AuthBackend::Local(salt) => LocalVerifier::new(store, salt.clone()).into(),
        })
    }
}

impl From<LocalVerifier> for AnyVerifier {
    fn from(verifier: LocalVerifier) -> Self {
        Self::Local(verifier)
    }
}

impl From<RemoteVerifier> for AnyVerifier {
    fn from(verifier: RemoteVerifier) -> Self {
        Self::Remote(verifier)
    }
}

impl CredentialVerifier for AnyVerifier {
    fn kind(&self) -> &'static str {
        match self {
            Self::Local(v) => v.kind(),
            Self::Remote(v) => v.kind(),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<Authenticated, AuthError> {
        match self {
            Self::Local(v) => v.register(registration).await,
            Self::Remote(v) => v.register(registration).await,
        }
    }

    async fn verify(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Authenticated, AuthError> {
        match self {
            Self::Local(v) => v.verify(email, password).await,
            Self::Remote(v) => v.verify(email, password).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_from_backend_selects_verifier() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));

        let remote = AuthBackend::Remote(Url::parse("http://127.0.0.1:8080/api/auth").unwrap());
        let verifier = AnyVerifier::from_backend(&remote, store.clone()).unwrap();
        assert_eq!(verifier.kind(), "remote");

        let local = AuthBackend::Local(SecretString::from("q8Zr!4kP@x2Lm#9v"));
        let verifier = AnyVerifier::from_backend(&local, store).unwrap();
        assert_eq!(verifier.kind(), "local");
    }
}
