//! Integration tests for `RemoteVerifier` against the real auth API.
//!
//! Each test serves the router on an ephemeral port.

#![allow(clippy::unwrap_used)]

use brewhouse_core::{Email, Field, SessionStatus};
use brewhouse_integration_tests::{Fixture, PASSWORD, ana, spawn_auth_api};
use brewhouse_storefront::services::auth::{
    AuthError, AuthGuard, CredentialVerifier, RemoteVerifier,
};
use secrecy::SecretString;
use url::Url;

async fn remote_guard(fx: &Fixture) -> AuthGuard<RemoteVerifier> {
    let endpoint = spawn_auth_api().await;
    let verifier = RemoteVerifier::new(endpoint).unwrap();
    AuthGuard::new(verifier, fx.store.clone(), fx.security_log())
}

#[tokio::test]
async fn test_register_issues_token() {
    let fx = Fixture::new();
    let guard = remote_guard(&fx).await;

    let identity = guard.register(&ana()).await.unwrap();
    assert_eq!(identity.email.as_str(), "ana@x.com");

    let session = guard.session().unwrap();
    assert_eq!(session.token.unwrap().as_str().len(), 64);
    assert_eq!(guard.status(), SessionStatus::LoggedIn);
}

#[tokio::test]
async fn test_login_after_logout() {
    let fx = Fixture::new();
    let guard = remote_guard(&fx).await;
    let registered = guard.register(&ana()).await.unwrap();
    assert!(guard.logout());

    let identity = guard
        .login("ANA@x.com", &SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert_eq!(identity.id, registered.id);
}

#[tokio::test]
async fn test_remote_errors_map_to_auth_errors() {
    let fx = Fixture::new();
    let guard = remote_guard(&fx).await;
    guard.register(&ana()).await.unwrap();

    let err = guard.register(&ana()).await.unwrap_err();
    assert!(matches!(err, AuthError::UserAlreadyExists { .. }));

    let err = guard
        .login("ana@x.com", &SecretString::from("Wrong1!x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = guard
        .login("nobody@x.com", &SecretString::from(PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(guard.failed_attempts("ana@x.com"), 1);
}

#[tokio::test]
async fn test_server_validation_reports_field() {
    let endpoint = spawn_auth_api().await;
    let verifier = RemoteVerifier::new(endpoint).unwrap();

    // Bypass client-side validation to exercise the server's.
    let email = Email::parse("ana@x.com").unwrap();
    let err = verifier
        .verify(&email, &SecretString::from(""))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, AuthError::Validation(e) if e.field == Field::Password),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let fx = Fixture::new();
    let endpoint = Url::parse("http://127.0.0.1:9/api/auth").unwrap();
    let guard = AuthGuard::new(
        RemoteVerifier::new(endpoint).unwrap(),
        fx.store.clone(),
        fx.security_log(),
    );

    let err = guard.register(&ana()).await.unwrap_err();
    assert!(matches!(err, AuthError::Http(_)));
    assert_eq!(guard.status(), SessionStatus::LoggedOut);
}
