//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Client (`brewhouse` CLI and embedding apps)
//! - `BREWHOUSE_AUTH_ENDPOINT` - Auth API URL; when set, logins go to the API
//! - `BREWHOUSE_AUTH_SALT` - Application salt for offline logins (required
//!   when no endpoint is set; min 16 chars, high entropy)
//! - `BREWHOUSE_STORE_PATH` - Session store file (default: .brewhouse/store.json)
//! - `BREWHOUSE_SESSION_TIMEOUT_HOURS` - Session lifetime (default: 24)
//! - `BREWHOUSE_USER_AGENT` - Reported in security events
//! - `BREWHOUSE_PAGE_URL` - Reported in security events
//!
//! ## Auth API (`brewhouse-auth-api`)
//! - `BREWHOUSE_API_HOST` - Bind address (default: 127.0.0.1)
//! - `BREWHOUSE_API_PORT` - Listen port (default: 8080)
//! - `BREWHOUSE_API_SESSION_TTL_HOURS` - Issued token lifetime (default: 24)
//! - `BREWHOUSE_API_RATE_LIMIT` - Per-IP rate limiting (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::services::audit::ClientContext;

const MIN_SALT_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change_me",
    "change-me",
    "default",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where credentials are checked.
#[derive(Clone)]
pub enum AuthBackend {
    /// The auth API at this URL.
    Remote(Url),
    /// The offline verifier with this application salt.
    Local(SecretString),
}

impl std::fmt::Debug for AuthBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => f.debug_tuple("Remote").field(&url.as_str()).finish(),
            Self::Local(_) => f.debug_tuple("Local").field(&"[REDACTED]").finish(),
        }
    }
}

/// Client-side configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend: AuthBackend,
    /// JSON file holding the session store
    pub store_path: PathBuf,
    /// How long sessions and cart entries stay valid
    pub session_timeout: Duration,
    /// Metadata attached to security events
    pub context: ClientContext,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the salt is missing in offline mode, if a
    /// value does not parse, or if the salt fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = match get_optional_env("BREWHOUSE_AUTH_ENDPOINT") {
            Some(endpoint) => AuthBackend::Remote(Url::parse(&endpoint).map_err(|e| {
                ConfigError::InvalidEnvVar("BREWHOUSE_AUTH_ENDPOINT".to_string(), e.to_string())
            })?),
            None => AuthBackend::Local(get_validated_salt("BREWHOUSE_AUTH_SALT")?),
        };

        let store_path =
            PathBuf::from(get_env_or_default("BREWHOUSE_STORE_PATH", ".brewhouse/store.json"));

        let timeout_hours: u64 = parse_env("BREWHOUSE_SESSION_TIMEOUT_HOURS", "24")?;
        if timeout_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BREWHOUSE_SESSION_TIMEOUT_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let context = ClientContext {
            user_agent: get_optional_env("BREWHOUSE_USER_AGENT")
                .or_else(|| Some(concat!("brewhouse/", env!("CARGO_PKG_VERSION")).to_string())),
            url: get_optional_env("BREWHOUSE_PAGE_URL"),
        };

        Ok(Self {
            backend,
            store_path,
            session_timeout: Duration::from_secs(timeout_hours.saturating_mul(SECONDS_PER_HOUR)),
            context,
        })
    }
}

/// Auth API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Lifetime of issued session tokens
    pub session_ttl: TimeDelta,
    /// Whether per-IP rate limiting is applied
    pub rate_limit: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            session_ttl: TimeDelta::hours(24),
            rate_limit: true,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = parse_env("BREWHOUSE_API_HOST", "127.0.0.1")?;
        let port = parse_env("BREWHOUSE_API_PORT", "8080")?;
        let ttl_hours: i64 = parse_env("BREWHOUSE_API_SESSION_TTL_HOURS", "24")?;
        let session_ttl = TimeDelta::try_hours(ttl_hours)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "BREWHOUSE_API_SESSION_TTL_HOURS".to_string(),
                    format!("{ttl_hours} is out of range"),
                )
            })?;
        let rate_limit = parse_env("BREWHOUSE_API_RATE_LIMIT", "true")?;

        Ok(Self {
            host,
            port,
            session_ttl,
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.chars().count() < MIN_SALT_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_SALT_LENGTH} characters (got {})",
                secret.chars().count()
            ),
        ));
    }

    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (randomly generated salts have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated salt."
            ),
        ));
    }

    Ok(())
}

/// Load and validate the application salt from environment.
fn get_validated_salt(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
