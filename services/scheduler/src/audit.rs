//! Structured audit log
//!
//! Significant state changes append an entry to the audit collection. A
//! failure to persist an audit entry is logged and swallowed — the log must
//! never fail the operation that triggered it.

use crate::storage::JsonStore;
use types::records::AuditEntry;

pub struct AuditLog {
    store: JsonStore<AuditEntry>,
}

impl AuditLog {
    pub fn new(store: JsonStore<AuditEntry>) -> Self {
        Self { store }
    }

    /// Record a system-originated event.
    pub fn record(&self, kind: &str, message: impl Into<String>) {
        self.record_as(kind, "SYSTEM", message);
    }

    /// Record an event attributed to a user.
    pub fn record_as(&self, kind: &str, user: &str, message: impl Into<String>) {
        let entry = AuditEntry::now(kind, user, message.into());
        if let Err(e) = self.store.add(entry) {
            tracing::warn!(kind, error = %e, "failed to persist audit entry");
        }
    }
}
