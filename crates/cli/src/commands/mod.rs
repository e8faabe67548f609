//! CLI command implementations.
//!
//! Every command opens the same [`Workspace`]: the JSON file store named by
//! `BREWHOUSE_STORE_PATH`, wrapped in a [`SessionStore`] with the configured
//! timeout. Expired entries are swept once when it opens.

pub mod account;
pub mod cart;

use std::sync::Arc;

use brewhouse_storefront::config::{ClientConfig, ConfigError};
use brewhouse_storefront::services::audit::SecurityLog;
use brewhouse_storefront::services::auth::{AnyVerifier, AuthError, AuthGuard};
use brewhouse_storefront::services::cart::{CartError, CartLedger, CheckoutError};
use brewhouse_storefront::store::{FileStore, SessionStore, StoreError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store file could not be opened.
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    /// Register or login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A cart change was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout was refused.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Bad command-line input.
    #[error("{0}")]
    Usage(String),
}

/// The opened session store and the configuration it came from.
pub struct Workspace {
    config: ClientConfig,
    store: SessionStore,
    swept_on_open: usize,
}

impl Workspace {
    /// Load configuration, open the store file, and sweep stale entries.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` or `CliError::Store` if either step fails.
    pub fn open() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Open the store named by an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Store` if the store file cannot be read.
    pub fn with_config(config: ClientConfig) -> Result<Self, CliError> {
        let backend = FileStore::open(&config.store_path)?;
        let store = SessionStore::new(Arc::new(backend)).with_timeout(config.session_timeout);

        let swept = store.sweep_expired();
        tracing::debug!(
            path = %config.store_path.display(),
            swept,
            "Opened session store"
        );

        Ok(Self {
            config,
            store,
            swept_on_open: swept,
        })
    }

    /// An auth guard over this store, using the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Auth` if the HTTP client cannot be built.
    pub fn guard(&self) -> Result<AuthGuard<AnyVerifier>, CliError> {
        let verifier = AnyVerifier::from_backend(&self.config.backend, self.store.clone())?;
        let audit = SecurityLog::tracing().with_context(self.config.context.clone());
        Ok(AuthGuard::new(verifier, self.store.clone(), audit))
    }

    /// The cart stored in this workspace.
    #[must_use]
    pub fn cart(&self) -> CartLedger {
        CartLedger::load(self.store.clone())
    }

    /// Delete stale entries. Returns how many were removed, including
    /// those swept when the workspace opened.
    #[must_use]
    pub fn sweep(&self) -> usize {
        self.swept_on_open + self.store.sweep_expired()
    }
}
