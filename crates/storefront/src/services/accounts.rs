//! Server-side account service behind `POST /api/auth`.
//!
//! Passwords are hashed with Argon2id. Every successful register or login
//! issues a random 32-byte session token.

use chrono::TimeDelta;

use brewhouse_core::{Email, Field, PasswordPolicy, Profile, SessionToken, ValidationError, sanitize_input};

use crate::clock::Clock;
use crate::db::sessions::SessionRepository;
use crate::db::users::UserRepository;
use crate::db::{Database, RepositoryError};
use crate::models::{Identity, LoginRequest, RegisterRequest};
use crate::services::auth::AuthError;
use crate::services::auth::password::{hash_password, verify_dummy_password, verify_password};

/// Account service.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
    sessions: SessionRepository<'a>,
    clock: &'a dyn Clock,
    session_ttl: TimeDelta,
    policy: PasswordPolicy,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub fn new(db: &'a Database, clock: &'a dyn Clock, session_ttl: TimeDelta) -> Self {
        Self {
            users: UserRepository::new(db),
            sessions: SessionRepository::new(db),
            clock,
            session_ttl,
            policy: PasswordPolicy::default(),
        }
    }

    /// Register a new account and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for the first invalid field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub fn register(&self, request: &RegisterRequest) -> Result<(Identity, SessionToken), AuthError> {
        let profile = Profile::parse(&request.name, &request.email, &request.phone, &request.address)?;
        self.policy.validate(&request.password)?;

        let password_hash = hash_password(&request.password)?;
        let email = profile.email.redacted();

        let identity = self
            .users
            .create(Identity::from_profile(profile, self.clock.now()), password_hash)
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists {
                    email: email.clone(),
                },
                other => AuthError::Repository(other),
            })?;

        let token = self.issue_token(&identity)?;
        tracing::info!(email = %email, "Account registered");
        Ok((identity, token))
    }

    /// Check a password and open a session.
    ///
    /// Unknown emails and wrong passwords both yield
    /// `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is missing or malformed.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub fn login(&self, request: &LoginRequest) -> Result<(Identity, SessionToken), AuthError> {
        let email = Email::parse(&sanitize_input(&request.email)).map_err(ValidationError::from)?;
        if request.password.is_empty() {
            return Err(ValidationError::new(Field::Password, "password is required").into());
        }

        let Some((identity, password_hash)) = self.users.get_password_hash(&email)? else {
            verify_dummy_password(&request.password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(&request.password, &password_hash)?;

        let token = self.issue_token(&identity)?;
        tracing::info!(email = %email.redacted(), "Account logged in");
        Ok((identity, token))
    }

    /// Drop expired session tokens. Returns how many were removed.
    pub fn purge_expired_sessions(&self) -> usize {
        self.sessions.purge_expired(self.clock.now())
    }

    fn issue_token(&self, identity: &Identity) -> Result<SessionToken, AuthError> {
        let bytes: [u8; 32] = rand::random();
        let token = SessionToken::new(hex::encode(bytes));
        let expires_at = self.clock.now() + self.session_ttl;

        self.sessions
            .create(&token, identity.id.clone(), expires_at)?;
        Ok(token)
    }
}
