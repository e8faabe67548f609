//! Security audit events.
//!
//! Every register/login/logout transition emits a [`SecurityEvent`] to an
//! [`AuditSink`]. Recording is fire-and-forget: sinks cannot fail the
//! operation that produced the event.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::clock::{Clock, SystemClock};

/// Kinds of security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    RegistrationSuccess,
    RegistrationFailed,
    LoginSuccess,
    LoginFailed,
    LoginRateLimited,
    Logout,
}

impl SecurityEventKind {
    /// Event name as it appears in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationSuccess => "registration_success",
            Self::RegistrationFailed => "registration_failed",
            Self::LoginSuccess => "login_success",
            Self::LoginFailed => "login_failed",
            Self::LoginRateLimited => "login_rate_limited",
            Self::Logout => "logout",
        }
    }

    /// Whether the event records a rejected attempt.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::RegistrationFailed | Self::LoginFailed | Self::LoginRateLimited
        )
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub event: SecurityEventKind,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub url: Option<String>,
}

/// Caller-supplied metadata attached to every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub url: Option<String>,
}

/// Receiver of security events.
pub trait AuditSink: Send + Sync {
    /// Record an event. Must not block.
    fn record(&self, event: &SecurityEvent);
}

/// Writes events to the `security` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &SecurityEvent) {
        let user_agent = event.user_agent.as_deref().unwrap_or("-");
        let url = event.url.as_deref().unwrap_or("-");

        if event.event.is_failure() {
            tracing::warn!(
                target: "security",
                event = event.event.as_str(),
                details = %event.details,
                timestamp = %event.timestamp,
                user_agent,
                url,
                "Security event"
            );
        } else {
            tracing::info!(
                target: "security",
                event = event.event.as_str(),
                details = %event.details,
                timestamp = %event.timestamp,
                user_agent,
                url,
                "Security event"
            );
        }
    }
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl MemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().clone()
    }

    /// Kinds of the recorded events, oldest first.
    #[must_use]
    pub fn kinds(&self) -> Vec<SecurityEventKind> {
        self.events.lock().iter().map(|e| e.event).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &SecurityEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Stamps events with time and client context before handing them to a sink.
#[derive(Clone)]
pub struct SecurityLog {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    context: ClientContext,
}

impl SecurityLog {
    /// Create a log over `sink` using the system clock and no context.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            clock: Arc::new(SystemClock),
            context: ClientContext::default(),
        }
    }

    /// A log writing to the `security` tracing target.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    /// Record an event of `kind` with free-form `details`.
    pub fn emit(&self, kind: SecurityEventKind, details: Value) {
        let event = SecurityEvent {
            event: kind,
            details,
            timestamp: self.clock.now(),
            user_agent: self.context.user_agent.clone(),
            url: self.context.url.clone(),
        };
        self.sink.record(&event);
    }
}

impl fmt::Debug for SecurityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityLog")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Redact a raw, possibly invalid, email for logging: the first three
/// characters of the local part and the domain stay visible.
#[must_use]
pub fn redact_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(3).collect();
            format!("{visible}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_redact_email() {
        assert_eq!(redact_email("ana.silva@x.com"), "ana***@x.com");
        assert_eq!(redact_email("jo@x.com"), "jo***@x.com");
        assert_eq!(redact_email("not-an-email"), "***");
    }

    #[test]
    fn test_emit_stamps_context_and_time() {
        let sink = MemoryAuditSink::new();
        let clock = ManualClock::starting_now();
        let log = SecurityLog::new(Arc::new(sink.clone()))
            .with_clock(Arc::new(clock.clone()))
            .with_context(ClientContext {
                user_agent: Some("brewhouse-cli/0.1".into()),
                url: Some("https://cafe.example/login".into()),
            });

        log.emit(SecurityEventKind::Logout, json!({ "email": "ana***@x.com" }));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, clock.now());
        assert_eq!(events[0].user_agent.as_deref(), Some("brewhouse-cli/0.1"));

        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["event"], "logout");
        assert_eq!(json["userAgent"], "brewhouse-cli/0.1");
    }

    #[test]
    fn test_failure_kinds() {
        assert!(SecurityEventKind::LoginRateLimited.is_failure());
        assert!(!SecurityEventKind::LoginSuccess.is_failure());
    }
}
