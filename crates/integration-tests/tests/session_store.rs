//! Integration tests for session expiry and the file-backed store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use brewhouse_integration_tests::{Fixture, PASSWORD, TEST_SALT, ana};
use brewhouse_storefront::clock::ManualClock;
use brewhouse_storefront::models::{CurrentSession, keys};
use brewhouse_storefront::services::audit::SecurityLog;
use brewhouse_storefront::services::auth::{AuthGuard, LocalVerifier};
use brewhouse_storefront::services::cart::CartLedger;
use brewhouse_storefront::store::{FileStore, KeyValueStore, SessionStore};
use chrono::TimeDelta;
use proptest::prelude::*;
use rust_decimal::Decimal;
use secrecy::SecretString;

// =============================================================================
// Expiry
// =============================================================================

proptest! {
    #[test]
    fn prop_entry_readable_exactly_until_expiry(
        timeout_secs in 1_u64..200_000,
        elapsed_ms in 0_i64..400_000_000,
    ) {
        let fx = Fixture::new();
        let store = fx.store.clone().with_timeout(Duration::from_secs(timeout_secs));
        prop_assert!(store.put("k", &"v"));

        fx.clock.advance(TimeDelta::milliseconds(elapsed_ms));
        let timeout_ms = i64::try_from(timeout_secs).unwrap() * 1000;
        let readable = store.get::<String>("k").is_some();
        prop_assert_eq!(readable, elapsed_ms < timeout_ms);

        // Expired entries are deleted on read.
        prop_assert_eq!(fx.backend.is_empty(), !readable);
    }
}

// =============================================================================
// File Persistence
// =============================================================================

fn file_store(path: &std::path::Path, clock: &ManualClock) -> SessionStore {
    SessionStore::with_clock(
        Arc::new(FileStore::open(path).unwrap()),
        Arc::new(clock.clone()),
    )
}

fn guard(store: &SessionStore) -> AuthGuard<LocalVerifier> {
    AuthGuard::new(
        LocalVerifier::new(store.clone(), SecretString::from(TEST_SALT)),
        store.clone(),
        SecurityLog::tracing(),
    )
}

#[tokio::test]
async fn test_session_and_cart_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("store.json");
    let clock = ManualClock::starting_now();

    {
        let store = file_store(&path, &clock);
        guard(&store).register(&ana()).await.unwrap();
        let mut cart = CartLedger::load(store);
        cart.add_item("Flat White", "Médio", "", Some(2), Decimal::new(1100, 2))
            .unwrap();
    }

    let store = file_store(&path, &clock);
    let guard = guard(&store);
    assert_eq!(guard.current_user().unwrap().email.as_str(), "ana@x.com");
    assert_eq!(CartLedger::load(store.clone()).total(), Decimal::new(2200, 2));

    guard.logout();
    guard
        .login("ana@x.com", &SecretString::from(PASSWORD))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sweep_on_reopen_removes_expired_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let clock = ManualClock::starting_now();

    {
        let store = file_store(&path, &clock);
        guard(&store).register(&ana()).await.unwrap();
    }

    clock.advance(TimeDelta::hours(24));
    let backend = Arc::new(FileStore::open(&path).unwrap());
    backend.set("theme", "dark").unwrap();
    let store = SessionStore::with_clock(backend.clone(), Arc::new(clock.clone()));

    // `user` and `current_user` are both a day old.
    assert_eq!(store.sweep_expired(), 2);
    assert_eq!(backend.keys().unwrap(), vec!["theme".to_string()]);
    assert!(guard(&store).current_user().is_none());
}

#[test]
fn test_two_processes_sharing_a_file_keep_both_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let clock = ManualClock::starting_now();
    let first = file_store(&path, &clock);
    let second = file_store(&path, &clock);

    CartLedger::load(first)
        .add_item("Latte", "", "", None, Decimal::TEN)
        .unwrap();
    assert!(second.put("theme", &"dark"));

    let reopened = file_store(&path, &clock);
    assert_eq!(CartLedger::load(reopened.clone()).total(), Decimal::TEN);
    assert_eq!(reopened.get::<String>("theme").as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_corrupted_file_starts_a_fresh_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not json").unwrap();
    let clock = ManualClock::starting_now();

    let store = file_store(&path, &clock);
    assert_eq!(store.sweep_expired(), 0);
    assert!(guard(&store).current_user().is_none());

    guard(&store).register(&ana()).await.unwrap();
    assert!(
        file_store(&path, &clock)
            .get::<CurrentSession>(keys::CURRENT_USER)
            .is_some()
    );
}
