//! Per-email failed-login counters.
//!
//! Counters live in process memory only. A counter older than the window is
//! treated as zero; five failures inside the window lock the email until the
//! window has passed since the last failure.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use super::AuthError;

/// Failures allowed before the lock engages.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// How long a lock (and a failure count) lasts after the last failure.
pub const LOCKOUT_WINDOW: TimeDelta = TimeDelta::minutes(15);

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u32,
    last_attempt: DateTime<Utc>,
}

/// Failed-login counters keyed by lower-cased email.
#[derive(Debug)]
pub struct LoginAttempts {
    counters: Mutex<HashMap<String, Counter>>,
    max_attempts: u32,
    window: TimeDelta,
}

impl Default for LoginAttempts {
    fn default() -> Self {
        Self::new(MAX_LOGIN_ATTEMPTS, LOCKOUT_WINDOW)
    }
}

impl LoginAttempts {
    #[must_use]
    pub fn new(max_attempts: u32, window: TimeDelta) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Lookup key for an email as typed by the user.
    #[must_use]
    pub fn key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Fail with [`AuthError::RateLimited`] if `email` is locked at `now`.
    ///
    /// A check never counts as an attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RateLimited`] with the whole minutes remaining,
    /// rounded up and at least 1.
    pub fn check(&self, email: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let key = Self::key(email);
        let mut counters = self.counters.lock();

        let Some(counter) = counters.get(&key).copied() else {
            return Ok(());
        };

        let elapsed = now - counter.last_attempt;
        if elapsed >= self.window {
            counters.remove(&key);
            return Ok(());
        }

        if counter.count >= self.max_attempts {
            let remaining = self.window - elapsed;
            return Err(AuthError::RateLimited {
                retry_after_minutes: ceil_minutes(remaining),
            });
        }

        Ok(())
    }

    /// Record a failed attempt at `now` and return the new count.
    pub fn record_failure(&self, email: &str, now: DateTime<Utc>) -> u32 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(Self::key(email)).or_insert(Counter {
            count: 0,
            last_attempt: now,
        });

        if now - counter.last_attempt >= self.window {
            counter.count = 0;
        }
        counter.count = counter.count.saturating_add(1);
        counter.last_attempt = now;
        counter.count
    }

    /// Forget every failure for `email`.
    pub fn clear(&self, email: &str) {
        self.counters.lock().remove(&Self::key(email));
    }

    /// Failures counted for `email` at `now`.
    #[must_use]
    pub fn failures(&self, email: &str, now: DateTime<Utc>) -> u32 {
        self.counters
            .lock()
            .get(&Self::key(email))
            .filter(|c| now - c.last_attempt < self.window)
            .map_or(0, |c| c.count)
    }
}

fn ceil_minutes(remaining: TimeDelta) -> i64 {
    let millis = remaining.num_milliseconds();
    let minute = TimeDelta::minutes(1).num_milliseconds();
    ((millis + minute - 1) / minute).max(1)
}
