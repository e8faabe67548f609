//! Application state shared across handlers.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::ApiConfig;
use crate::db::Database;
use crate::services::accounts::AccountService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the account database and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    db: Database,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state reading time from the system clock.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new application state reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: ApiConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db: Database::new(),
                clock,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the account database.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Account operations bound to this state.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(
            &self.inner.db,
            self.inner.clock.as_ref(),
            self.inner.config.session_ttl,
        )
    }
}
