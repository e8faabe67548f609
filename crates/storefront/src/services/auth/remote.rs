//! Verifier that calls the auth API (`POST /api/auth`).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use brewhouse_core::{Email, ValidationError};

use super::verifier::{Authenticated, CredentialVerifier, Registration};
use super::AuthError;
use crate::models::{AuthRequest, AuthResponse, LoginRequest, RegisterRequest};

/// Request timeout for auth API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the auth API.
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl RemoteVerifier {
    /// Create a verifier posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: Url) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("brewhouse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Create a verifier with a preconfigured client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// The endpoint requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &AuthRequest, email: &Email) -> Result<AuthResponse, AuthError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok());

        // Error bodies from proxies may not be JSON.
        let body = response.json::<AuthResponse>().await.unwrap_or_default();

        if status.is_success() && body.success {
            return Ok(body);
        }

        let message = body.error.clone().unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });

        tracing::debug!(
            action = %request.action(),
            status = status.as_u16(),
            error = %message,
            "Auth API rejected request"
        );

        Err(match status {
            StatusCode::BAD_REQUEST => match body.field {
                Some(field) => ValidationError::new(field, message).into(),
                None => AuthError::BadRequest(message),
            },
            StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials,
            StatusCode::CONFLICT => AuthError::UserAlreadyExists {
                email: email.redacted(),
            },
            StatusCode::TOO_MANY_REQUESTS => AuthError::RateLimited {
                retry_after_minutes: retry_after.map_or(1, |secs| ((secs + 59) / 60).max(1)),
            },
            _ => AuthError::Remote {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn login(&self, email: &Email, password: &SecretString) -> Result<Authenticated, AuthError> {
        let request = AuthRequest::Login(LoginRequest {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
        });

        let body = self.send(&request, email).await?;
        Self::authenticated(body)
    }

    fn authenticated(body: AuthResponse) -> Result<Authenticated, AuthError> {
        let identity = body.user.ok_or_else(|| AuthError::Remote {
            status: StatusCode::OK.as_u16(),
            message: "response did not include the user".to_string(),
        })?;

        Ok(Authenticated {
            identity,
            token: body.token,
        })
    }
}

impl CredentialVerifier for RemoteVerifier {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn register(&self, registration: &Registration) -> Result<Authenticated, AuthError> {
        let profile = &registration.profile;
        let request = AuthRequest::Register(RegisterRequest {
            name: profile.name.to_string(),
            email: profile.email.to_string(),
            phone: profile.phone.to_string(),
            address: profile.address.to_string(),
            password: registration.password.expose_secret().to_string(),
        });

        let body = self.send(&request, &profile.email).await?;
        if body.user.is_some() {
            return Self::authenticated(body);
        }

        // Older servers only acknowledge the registration; log in to get a session.
        self.login(&profile.email, &registration.password).await
    }

    async fn verify(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Authenticated, AuthError> {
        self.login(email, password).await
    }
}
