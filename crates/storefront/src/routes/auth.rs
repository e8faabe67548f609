//! Authentication endpoint.
//!
//! A single `POST /api/auth` handles both registration and login, chosen by
//! the `action` field of the JSON body. Every response, success or failure,
//! is an [`AuthResponse`].

use axum::{Json, body::Bytes, extract::State};
use tracing::instrument;

use crate::error::{ApiError, Result, set_sentry_user};
use crate::models::{AuthRequest, AuthResponse};
use crate::state::AppState;

/// Register or log in.
///
/// Argon2 hashing runs on the blocking pool.
#[instrument(skip_all)]
pub async fn auth(State(state): State<AppState>, body: Bytes) -> Result<Json<AuthResponse>> {
    let request = parse_request(&body)?;
    let action = request.action();
    tracing::debug!(%action, "Auth request");

    let response = tokio::task::spawn_blocking(move || {
        let accounts = state.accounts();
        match request {
            AuthRequest::Register(fields) => {
                let (identity, token) = accounts.register(&fields)?;
                set_sentry_user(&identity.id);
                Ok::<_, ApiError>(AuthResponse::authenticated(
                    identity,
                    token,
                    "User registered successfully",
                ))
            }
            AuthRequest::Login(fields) => {
                let (identity, token) = accounts.login(&fields)?;
                set_sentry_user(&identity.id);
                Ok(AuthResponse::authenticated(identity, token, "Login successful"))
            }
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("auth task failed: {e}")))??;

    Ok(Json(response))
}

/// Decode the body, reporting any unknown or missing action as
/// "Invalid action".
fn parse_request(body: &[u8]) -> Result<AuthRequest> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| invalid_action())?;

    match value.get("action").and_then(serde_json::Value::as_str) {
        Some("register" | "login") => serde_json::from_value(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}"))),
        _ => Err(invalid_action()),
    }
}

fn invalid_action() -> ApiError {
    ApiError::BadRequest("Invalid action".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brewhouse_core::AuthAction;

    use super::*;

    #[test]
    fn test_parse_request_actions() {
        let req = parse_request(br#"{"action":"login","email":"a@b.co","password":"x"}"#).unwrap();
        assert_eq!(req.action(), AuthAction::Login);

        let req = parse_request(br#"{"action":"register"}"#).unwrap();
        assert_eq!(req.action(), AuthAction::Register);
    }

    #[test]
    fn test_parse_request_rejects_unknown_action() {
        for body in [&br#"{"action":"reset"}"#[..], br#"{}"#, b"[]", b""] {
            let err = parse_request(body).unwrap_err();
            assert_eq!(err.to_string(), "Bad request: Invalid action");
        }
    }

    #[test]
    fn test_parse_request_rejects_wrong_field_types() {
        let err = parse_request(br#"{"action":"login","email":42}"#).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.starts_with("Invalid request body")));
    }
}
