//! Audit records and sinks
//!
//! Every decision produces one [`AuditLog`]. The shared fields live on the
//! record itself; the operation-specific fields live in [`AuditDetail`],
//! which is tagged by the operation name when serialized:
//!
//! ```json
//! {
//!   "id": "0190c6c4-...",
//!   "timestamp": "2026-01-01T00:00:00Z",
//!   "resource": "User",
//!   "userId": "u1",
//!   "result": "allow",
//!   "message": "Access granted through access level 'OWN'",
//!   "method": "can",
//!   "action": "READ",
//!   "resourceId": "u1"
//! }
//! ```
//!
//! Records are handed to an [`AuditSink`] when audit logging is enabled.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditResult {
    Allow,
    Deny,
}

impl AuditResult {
    /// Map a boolean outcome.
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            AuditResult::Allow
        } else {
            AuditResult::Deny
        }
    }
}

impl std::fmt::Display for AuditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditResult::Allow => f.write_str("allow"),
            AuditResult::Deny => f.write_str("deny"),
        }
    }
}

/// Operation-specific part of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum AuditDetail {
    /// `has_permission`
    HasPermission { action: String },

    /// `get_access_level`
    #[serde(rename_all = "camelCase")]
    GetAccessLevel {
        action: String,
        access_levels: Option<Vec<String>>,
    },

    /// `can_be`
    CanBe { relationship: String },

    /// `can`
    #[serde(rename_all = "camelCase")]
    Can {
        action: String,
        resource_id: Option<String>,
    },

    /// Request admission by the route guard
    Intercept,
}

impl AuditDetail {
    /// Operation name, as it appears in the `method` field.
    pub fn method(&self) -> &'static str {
        match self {
            AuditDetail::HasPermission { .. } => "hasPermission",
            AuditDetail::GetAccessLevel { .. } => "getAccessLevel",
            AuditDetail::CanBe { .. } => "canBe",
            AuditDetail::Can { .. } => "can",
            AuditDetail::Intercept => "intercept",
        }
    }

    /// Action, for the operations that take one.
    pub fn action(&self) -> Option<&str> {
        match self {
            AuditDetail::HasPermission { action }
            | AuditDetail::GetAccessLevel { action, .. }
            | AuditDetail::Can { action, .. } => Some(action),
            AuditDetail::CanBe { .. } | AuditDetail::Intercept => None,
        }
    }
}

/// Structured record of one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Decision ID (UUIDv7, time-ordered)
    pub id: Uuid,

    /// When the decision was made
    pub timestamp: DateTime<Utc>,

    /// Resource name the decision was about
    pub resource: String,

    /// Caller, or `unknown` when no context was available
    pub user_id: String,

    /// Allow or deny
    pub result: AuditResult,

    /// Human-readable explanation
    pub message: String,

    /// Operation-specific fields
    #[serde(flatten)]
    pub detail: AuditDetail,
}

impl AuditLog {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        detail: AuditDetail,
        resource: impl Into<String>,
        user_id: impl Into<String>,
        result: AuditResult,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            resource: resource.into(),
            user_id: user_id.into(),
            result,
            message: message.into(),
            detail,
        }
    }

    /// Operation name.
    pub fn method(&self) -> &'static str {
        self.detail.method()
    }

    /// Check whether the decision allowed the call.
    pub fn is_allowed(&self) -> bool {
        self.result == AuditResult::Allow
    }

    /// Check whether the decision denied the call.
    pub fn is_denied(&self) -> bool {
        self.result == AuditResult::Deny
    }
}

/// Receiver of audit records.
///
/// Sinks are called synchronously on the decision path and must not block.
pub trait AuditSink: Send + Sync {
    /// Record one decision.
    fn record(&self, log: &AuditLog);
}

impl<F> AuditSink for F
where
    F: Fn(&AuditLog) + Send + Sync,
{
    fn record(&self, log: &AuditLog) {
        self(log)
    }
}

/// Sink that emits each record as a `tracing` event.
///
/// Allowed decisions are logged at `info`, denied ones at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, log: &AuditLog) {
        match log.result {
            AuditResult::Allow => tracing::info!(
                decision_id = %log.id,
                method = log.method(),
                resource = %log.resource,
                user_id = %log.user_id,
                action = log.detail.action(),
                message = %log.message,
                "Authorization allowed"
            ),
            AuditResult::Deny => tracing::warn!(
                decision_id = %log.id,
                method = log.method(),
                resource = %log.resource,
                user_id = %log.user_id,
                action = log.detail.action(),
                message = %log.message,
                "Authorization denied"
            ),
        }
    }
}

/// Sink that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditLog>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all records so far, oldest first.
    pub fn records(&self) -> Vec<AuditLog> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<AuditLog> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Remove and return all records.
    pub fn take(&self) -> Vec<AuditLog> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, log: &AuditLog) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log.clone());
    }
}
