//! Integration tests for Brewhouse.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brewhouse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - register/login/logout, rate limiting, views sharing a store
//! - `remote_auth` - `RemoteVerifier` against the auth API on an ephemeral port
//! - `cart_checkout` - cart totals and checkout preconditions
//! - `session_store` - expiry and file persistence
//!
//! This module holds the fixtures they share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use brewhouse_storefront::clock::ManualClock;
use brewhouse_storefront::config::ApiConfig;
use brewhouse_storefront::routes;
use brewhouse_storefront::services::audit::{MemoryAuditSink, SecurityLog};
use brewhouse_storefront::services::auth::{AuthGuard, LocalVerifier, RegistrationForm};
use brewhouse_storefront::state::AppState;
use brewhouse_storefront::store::{MemoryStore, SessionStore};
use secrecy::SecretString;
use url::Url;

/// Application salt used by offline verifiers in tests.
pub const TEST_SALT: &str = "q8Zr!4kP@x2Lm#9v";

/// Password that satisfies the default policy.
pub const PASSWORD: &str = "Abcdef1!";

/// One in-memory store with a controllable clock.
pub struct Fixture {
    pub backend: MemoryStore,
    pub clock: ManualClock,
    pub store: SessionStore,
    pub audit: MemoryAuditSink,
}

impl Fixture {
    #[must_use]
    pub fn new() -> Self {
        let backend = MemoryStore::new();
        let clock = ManualClock::starting_now();
        let store = SessionStore::with_clock(Arc::new(backend.clone()), Arc::new(clock.clone()));
        Self {
            backend,
            clock,
            store,
            audit: MemoryAuditSink::new(),
        }
    }

    /// A security log recording into [`Fixture::audit`].
    #[must_use]
    pub fn security_log(&self) -> SecurityLog {
        SecurityLog::new(Arc::new(self.audit.clone())).with_clock(Arc::new(self.clock.clone()))
    }

    /// A new guard over the shared store, as a second browser tab would
    /// create one.
    #[must_use]
    pub fn local_guard(&self) -> AuthGuard<LocalVerifier> {
        let verifier = LocalVerifier::new(self.store.clone(), SecretString::from(TEST_SALT));
        AuthGuard::new(verifier, self.store.clone(), self.security_log())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The registration form for Ana, used throughout the tests.
#[must_use]
pub fn ana() -> RegistrationForm {
    registration("Ana Silva", "ana@x.com")
}

/// A valid registration form with the given name and email.
#[must_use]
pub fn registration(name: &str, email: &str) -> RegistrationForm {
    RegistrationForm {
        name: name.to_string(),
        email: email.to_string(),
        phone: "(11) 91234-5678".to_string(),
        address: "Rua A, 100, SP".to_string(),
        password: SecretString::from(PASSWORD),
    }
}

/// Serve the auth API on an ephemeral local port.
///
/// Returns the `/api/auth` URL. The server runs until the test runtime
/// shuts down.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_auth_api() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");

    let app = routes::router(AppState::new(ApiConfig::default()));
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .ok();
    });

    Url::parse(&format!("http://{addr}/api/auth")).expect("valid URL")
}
