//! Authentication guard.
//!
//! [`AuthGuard`] validates registration forms, rate-limits logins per email,
//! delegates credential checks to a [`CredentialVerifier`], and keeps the
//! logged-in identity in the [`SessionStore`].
//!
//! State per store: `LoggedOut -> LoggedIn` on register or login,
//! `LoggedIn -> LoggedOut` on logout or session expiry.

mod attempts;
mod error;
pub mod local;
pub mod password;
pub mod remote;
pub mod verifier;

pub use attempts::{LOCKOUT_WINDOW, LoginAttempts, MAX_LOGIN_ATTEMPTS};
pub use error::AuthError;
pub use local::LocalVerifier;
pub use remote::RemoteVerifier;
pub use verifier::{AnyVerifier, Authenticated, CredentialVerifier, Registration};

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use brewhouse_core::{
    Email, Field, PasswordPolicy, Profile, SessionStatus, ValidationError, sanitize_input,
};

use crate::models::{CurrentSession, Identity, keys};
use crate::services::audit::{SecurityEventKind, SecurityLog, redact_email};
use crate::store::SessionStore;

/// Anything that can say who is logged in.
pub trait SessionProvider {
    /// The logged-in identity, if any.
    fn current_user(&self) -> Option<Identity>;
}

/// Raw registration form input.
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: SecretString,
}

impl RegistrationForm {
    /// Sanitize and validate every field, name first and password last.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self, policy: &PasswordPolicy) -> Result<Registration, ValidationError> {
        let profile = Profile::parse(&self.name, &self.email, &self.phone, &self.address)?;
        policy.validate(self.password.expose_secret())?;

        Ok(Registration {
            profile,
            password: SecretString::from(self.password.expose_secret().to_owned()),
        })
    }
}

/// Register, login, and logout over one session store.
#[derive(Debug)]
pub struct AuthGuard<V> {
    verifier: V,
    store: SessionStore,
    attempts: LoginAttempts,
    policy: PasswordPolicy,
    audit: SecurityLog,
}

impl<V: CredentialVerifier> AuthGuard<V> {
    /// Create a guard with the default password policy and rate limit.
    pub fn new(verifier: V, store: SessionStore, audit: SecurityLog) -> Self {
        Self {
            verifier,
            store,
            attempts: LoginAttempts::default(),
            policy: PasswordPolicy::default(),
            audit,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: LoginAttempts) -> Self {
        self.attempts = attempts;
        self
    }

    pub const fn verifier(&self) -> &V {
        &self.verifier
    }

    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for the first invalid field,
    /// [`AuthError::UserAlreadyExists`] for a duplicate email, and
    /// [`AuthError::StorageUnavailable`] if the session cannot be saved.
    #[tracing::instrument(skip_all, fields(verifier = self.verifier.kind()))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<Identity, AuthError> {
        let registration = match form.validate(&self.policy) {
            Ok(registration) => registration,
            Err(e) => {
                self.audit.emit(
                    SecurityEventKind::RegistrationFailed,
                    json!({
                        "email": redact_email(&form.email),
                        "field": e.field,
                        "reason": e.message,
                    }),
                );
                return Err(e.into());
            }
        };

        let email = registration.profile.email.redacted();

        let authenticated = match self.verifier.register(&registration).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                self.audit.emit(
                    SecurityEventKind::RegistrationFailed,
                    json!({ "email": email, "reason": e.to_string() }),
                );
                return Err(e);
            }
        };

        let identity = self.start_session(authenticated)?;

        tracing::info!(email = %email, "Customer registered");
        self.audit.emit(
            SecurityEventKind::RegistrationSuccess,
            json!({ "email": email, "userId": identity.id }),
        );

        Ok(identity)
    }

    /// Log in with an email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RateLimited`] while the email is locked (no
    /// password check happens), [`AuthError::UserNotFound`] or
    /// [`AuthError::InvalidCredentials`] on a wrong email or password,
    /// [`AuthError::Validation`] for malformed input, and
    /// [`AuthError::StorageUnavailable`] if the session cannot be saved.
    #[tracing::instrument(skip_all, fields(verifier = self.verifier.kind()))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let now = self.store.clock().now();
        let redacted = redact_email(email);

        if let Err(e) = self.attempts.check(email, now) {
            tracing::warn!(email = %redacted, "Login rejected by rate limit");
            self.audit.emit(
                SecurityEventKind::LoginRateLimited,
                json!({ "email": redacted, "reason": e.to_string() }),
            );
            return Err(e);
        }

        let parsed = Email::parse(&sanitize_input(email)).map_err(ValidationError::from)?;
        if password.expose_secret().is_empty() {
            return Err(ValidationError::new(Field::Password, "password is required").into());
        }

        match self.verifier.verify(&parsed, password).await {
            Ok(authenticated) => {
                self.attempts.clear(email);
                let identity = self.start_session(authenticated)?;

                tracing::info!(email = %redacted, "Customer logged in");
                self.audit.emit(
                    SecurityEventKind::LoginSuccess,
                    json!({ "email": redacted, "userId": identity.id }),
                );
                Ok(identity)
            }
            Err(e) if e.is_credential_failure() => {
                let failures = self.attempts.record_failure(email, now);
                self.audit.emit(
                    SecurityEventKind::LoginFailed,
                    json!({
                        "email": redacted,
                        "reason": e.to_string(),
                        "attempts": failures,
                    }),
                );
                Err(e)
            }
            Err(e @ AuthError::RateLimited { .. }) => {
                self.audit.emit(
                    SecurityEventKind::LoginRateLimited,
                    json!({ "email": redacted, "reason": e.to_string() }),
                );
                Err(e)
            }
            Err(e) => {
                tracing::error!(email = %redacted, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// End the current session. The stored account is kept.
    ///
    /// Returns `false` if the store rejected the delete.
    pub fn logout(&self) -> bool {
        let previous = self.current_user();
        let removed = self.store.remove(keys::CURRENT_USER);

        if let Some(identity) = previous {
            tracing::info!(email = %identity.email.redacted(), "Customer logged out");
            self.audit.emit(
                SecurityEventKind::Logout,
                json!({ "email": identity.email.redacted(), "userId": identity.id }),
            );
        }

        removed
    }

    /// The logged-in identity, read fresh from the store.
    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.session().map(|session| session.identity)
    }

    /// The full current-session record.
    #[must_use]
    pub fn session(&self) -> Option<CurrentSession> {
        self.store.get(keys::CURRENT_USER)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.session().is_some() {
            SessionStatus::LoggedIn
        } else {
            SessionStatus::LoggedOut
        }
    }

    /// Failed logins currently counted for `email`.
    #[must_use]
    pub fn failed_attempts(&self, email: &str) -> u32 {
        self.attempts.failures(email, self.store.clock().now())
    }

    fn start_session(&self, authenticated: Authenticated) -> Result<Identity, AuthError> {
        let session = CurrentSession {
            identity: authenticated.identity,
            token: authenticated.token,
            logged_in_at: self.store.clock().now(),
        };

        if !self.store.put(keys::CURRENT_USER, &session) {
            return Err(AuthError::StorageUnavailable);
        }

        Ok(session.identity)
    }
}

impl<V: CredentialVerifier> SessionProvider for AuthGuard<V> {
    fn current_user(&self) -> Option<Identity> {
        Self::current_user(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;

    use super::*;
    use crate::clock::ManualClock;
    use crate::services::audit::MemoryAuditSink;
    use crate::store::{KeyValueStore, MemoryStore};

    struct Fixture {
        guard: AuthGuard<LocalVerifier>,
        backend: MemoryStore,
        clock: ManualClock,
        audit: MemoryAuditSink,
    }

    fn fixture() -> Fixture {
        let backend = MemoryStore::new();
        let clock = ManualClock::starting_now();
        let store = SessionStore::with_clock(Arc::new(backend.clone()), Arc::new(clock.clone()));
        let audit = MemoryAuditSink::new();
        let verifier = LocalVerifier::new(store.clone(), SecretString::from("t3st-s@lt-9f2k"));
        let guard = AuthGuard::new(
            verifier,
            store,
            SecurityLog::new(Arc::new(audit.clone())).with_clock(Arc::new(clock.clone())),
        );
        Fixture {
            guard,
            backend,
            clock,
            audit,
        }
    }

    fn form(email: &str) -> RegistrationForm {
        RegistrationForm {
            name: "Ana Silva".into(),
            email: email.into(),
            phone: "(11) 91234-5678".into(),
            address: "Rua A, 100, SP".into(),
            password: SecretString::from("Abcdef1!"),
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[tokio::test]
    async fn test_register_logs_in_and_redacts() {
        let f = fixture();
        let identity = f.guard.register(&form("ana@x.com")).await.unwrap();

        assert_eq!(f.guard.current_user(), Some(identity.clone()));
        assert_eq!(f.guard.status(), SessionStatus::LoggedIn);

        let raw = f.backend.get("cs_current_user").unwrap().unwrap();
        assert!(!raw.contains("passwordHash"));
        let raw = f.backend.get("cs_user").unwrap().unwrap();
        assert!(raw.contains("passwordHash"));

        assert_eq!(f.audit.kinds(), vec![SecurityEventKind::RegistrationSuccess]);
    }

    #[tokio::test]
    async fn test_register_reports_first_invalid_field() {
        let f = fixture();
        let mut bad = form("not-an-email");
        bad.name = "A".into();

        let err = f.guard.register(&bad).await.unwrap_err();
        let AuthError::Validation(e) = err else {
            panic!("expected validation error");
        };
        assert_eq!(e.field, Field::Name);
        assert_eq!(f.audit.kinds(), vec![SecurityEventKind::RegistrationFailed]);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let f = fixture();
        let mut weak = form("ana@x.com");
        weak.password = secret("abcdefgh");
        let err = f.guard.register(&weak).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref e) if e.field == Field::Password));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();
        let err = f.guard.register(&form("ANA@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_logout_keeps_account() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();

        assert!(f.guard.logout());
        assert_eq!(f.guard.current_user(), None);
        assert_eq!(f.guard.status(), SessionStatus::LoggedOut);
        assert!(f.backend.get("cs_user").unwrap().is_some());

        let identity = f.guard.login("ana@x.com", &secret("Abcdef1!")).await.unwrap();
        assert_eq!(identity.email.as_str(), "ana@x.com");
    }

    #[tokio::test]
    async fn test_login_unknown_email_counts_as_failure() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();
        let err = f
            .guard
            .login("bob@x.com", &secret("Abcdef1!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(f.guard.failed_attempts("bob@x.com"), 1);
    }

    #[tokio::test]
    async fn test_login_is_rate_limited_after_five_failures() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();
        f.guard.logout();

        for _ in 0..5 {
            let err = f.guard.login("ana@x.com", &secret("wrong")).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        let err = f
            .guard
            .login("ana@x.com", &secret("Abcdef1!"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::RateLimited {
                retry_after_minutes: 15
            }
        ));
        assert_eq!(f.guard.current_user(), None);

        f.clock.advance(TimeDelta::minutes(15));
        f.guard.login("ana@x.com", &secret("Abcdef1!")).await.unwrap();
        assert_eq!(f.guard.failed_attempts("ana@x.com"), 0);
    }

    #[tokio::test]
    async fn test_session_expires_after_timeout() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();
        f.clock.advance(TimeDelta::hours(24));
        assert_eq!(f.guard.current_user(), None);
    }

    #[tokio::test]
    async fn test_unsaved_session_is_storage_unavailable() {
        // Room for the account but not for the session next to it.
        let backend = MemoryStore::with_quota(450);
        let store = SessionStore::new(Arc::new(backend.clone()));
        let verifier = LocalVerifier::new(store.clone(), secret("t3st-s@lt-9f2k"));
        let guard = AuthGuard::new(verifier, store, SecurityLog::new(Arc::new(MemoryAuditSink::new())));

        let err = guard.register(&form("ana@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable));
        assert!(backend.get("cs_user").unwrap().is_some());
        assert_eq!(guard.current_user(), None);
    }

    #[tokio::test]
    async fn test_disabled_storage_hides_account() {
        let f = fixture();
        f.guard.register(&form("ana@x.com")).await.unwrap();
        f.backend.set_available(false);
        let err = f
            .guard
            .login("ana@x.com", &secret("Abcdef1!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_requires_password() {
        let f = fixture();
        let err = f.guard.login("ana@x.com", &secret("")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref e) if e.field == Field::Password));
    }

    /// Rejects every password and counts how often it was asked.
    #[derive(Default)]
    struct CountingVerifier {
        checks: AtomicUsize,
    }

    impl CredentialVerifier for CountingVerifier {
        fn kind(&self) -> &'static str {
            "counting"
        }

        async fn register(&self, _registration: &Registration) -> Result<Authenticated, AuthError> {
            Err(AuthError::StorageUnavailable)
        }

        async fn verify(
            &self,
            _email: &Email,
            _password: &SecretString,
        ) -> Result<Authenticated, AuthError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::InvalidCredentials)
        }
    }

    #[tokio::test]
    async fn test_locked_login_never_reaches_verifier() {
        let clock = ManualClock::starting_now();
        let store = SessionStore::with_clock(Arc::new(MemoryStore::new()), Arc::new(clock.clone()));
        let guard = AuthGuard::new(
            CountingVerifier::default(),
            store,
            SecurityLog::new(Arc::new(MemoryAuditSink::new())),
        );

        for _ in 0..MAX_LOGIN_ATTEMPTS {
            let _ = guard.login("ana@x.com", &secret("wrong")).await;
        }
        assert_eq!(guard.verifier().checks.load(Ordering::SeqCst), 5);

        for _ in 0..3 {
            let err = guard.login("ANA@x.com", &secret("Abcdef1!")).await.unwrap_err();
            assert!(matches!(err, AuthError::RateLimited { .. }));
        }
        assert_eq!(guard.verifier().checks.load(Ordering::SeqCst), 5);

        clock.advance(TimeDelta::minutes(15));
        let _ = guard.login("ana@x.com", &secret("Abcdef1!")).await;
        assert_eq!(guard.verifier().checks.load(Ordering::SeqCst), 6);
    }
}
