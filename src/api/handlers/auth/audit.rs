//! Bounded in-memory audit trail of security events.
//!
//! Append-only with oldest-first eviction at capacity; retrieval is most
//! recent first. The buffer is process-local and lost on restart: an
//! operational record for debugging abuse, not a compliance log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const MAX_ENTRIES: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    Login,
    Logout,
    Register,
    FailedLogin,
    AccountLocked,
}

impl AuditEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Register => "register",
            Self::FailedLogin => "failed_login",
            Self::AccountLocked => "account_locked",
        }
    }
}

/// One security-relevant occurrence, as reported by a handler.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub user_id: Option<Uuid>,
    pub handle: Option<String>,
    pub email: Option<String>,
    pub client_addr: String,
    pub success: bool,
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    #[must_use]
    pub fn new(kind: AuditEventKind, client_addr: impl Into<String>, success: bool) -> Self {
        Self {
            kind,
            user_id: None,
            handle: None,
            email: None,
            client_addr: client_addr.into(),
            success,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A recorded event with its synthetic id and timestamp.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

#[derive(Debug)]
struct AuditLogInner {
    next_id: u64,
    entries: VecDeque<AuditEntry>,
}

#[derive(Debug)]
pub struct AuditLog {
    capacity: usize,
    inner: Mutex<AuditLogInner>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(AuditLogInner {
                next_id: 1,
                entries: VecDeque::with_capacity(capacity.min(MAX_ENTRIES)),
            }),
        }
    }

    pub fn append(&self, event: AuditEvent) {
        debug!(
            event = event.kind.as_str(),
            subject = event
                .handle
                .as_deref()
                .or(event.email.as_deref())
                .unwrap_or("unknown"),
            client_addr = %event.client_addr,
            success = event.success,
            "audit event"
        );

        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_front(AuditEntry {
            id,
            timestamp: Utc::now(),
            event,
        });
        if inner.entries.len() > self.capacity {
            inner.entries.truncate(self.capacity);
        }
    }

    /// Most recent events first, at most `limit`.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let Ok(inner) = self.inner.lock() else {
            return Vec::new();
        };
        inner.entries.iter().take(limit).cloned().collect()
    }

    /// Most recent events for one user, at most `limit`.
    #[must_use]
    pub fn for_user(&self, user_id: Uuid, limit: usize) -> Vec<AuditEntry> {
        let Ok(inner) = self.inner.lock() else {
            return Vec::new();
        };
        inner
            .entries
            .iter()
            .filter(|entry| entry.event.user_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_returns_most_recent_first() {
        let log = AuditLog::new();
        log.append(AuditEvent::new(AuditEventKind::Register, "1.2.3.4", true));
        log.append(AuditEvent::new(AuditEventKind::Login, "1.2.3.4", true));
        log.append(AuditEvent::new(
            AuditEventKind::FailedLogin,
            "5.6.7.8",
            false,
        ));

        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].event.kind, AuditEventKind::FailedLogin);
        assert_eq!(recent[1].event.kind, AuditEventKind::Login);
        assert_eq!(recent[2].event.kind, AuditEventKind::Register);
        assert!(recent[0].id > recent[1].id);
    }

    #[test]
    fn recent_respects_limit() {
        let log = AuditLog::new();
        for _ in 0..5 {
            log.append(AuditEvent::new(AuditEventKind::Login, "1.2.3.4", true));
        }
        assert_eq!(log.recent(2).len(), 2);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let log = AuditLog::with_capacity(3);
        for i in 0..5u64 {
            log.append(
                AuditEvent::new(AuditEventKind::Login, "1.2.3.4", true)
                    .with_metadata(serde_json::json!({ "seq": i })),
            );
        }

        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        // Ids keep increasing even as old entries fall off.
        assert_eq!(recent[0].id, 5);
        assert_eq!(recent[2].id, 3);
    }

    #[test]
    fn for_user_filters_by_user_id() {
        let log = AuditLog::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        log.append(AuditEvent::new(AuditEventKind::Login, "1.2.3.4", true).with_user_id(alice));
        log.append(AuditEvent::new(AuditEventKind::Login, "1.2.3.4", true).with_user_id(bob));
        log.append(
            AuditEvent::new(AuditEventKind::FailedLogin, "1.2.3.4", false).with_user_id(alice),
        );
        log.append(AuditEvent::new(AuditEventKind::Register, "1.2.3.4", true));

        let entries = log.for_user(alice, 10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.kind, AuditEventKind::FailedLogin);
        assert_eq!(entries[1].event.kind, AuditEventKind::Login);
    }

    #[test]
    fn event_builder_sets_optional_fields() {
        let user_id = Uuid::new_v4();
        let event = AuditEvent::new(AuditEventKind::AccountLocked, "server", false)
            .with_user_id(user_id)
            .with_handle("@alice")
            .with_email("alice@example.com")
            .with_metadata(serde_json::json!({ "remaining_seconds": 42 }));

        assert_eq!(event.user_id, Some(user_id));
        assert_eq!(event.handle.as_deref(), Some("@alice"));
        assert_eq!(event.email.as_deref(), Some("alice@example.com"));
        assert_eq!(event.kind.as_str(), "account_locked");
    }
}
