//! Audit sink trait.

use crate::domain::UserId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One audit log entry describing a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// User who performed the transition.
    pub actor: UserId,
    /// Dotted action name, e.g. `warranty.activate`.
    pub action: String,
    /// Entity kind the action touched, e.g. `warranty`.
    pub entity_type: String,
    /// Id of the touched entity, stringified.
    pub entity_id: String,
    /// Structured context for the entry.
    pub meta: serde_json::Value,
}

impl AuditEvent {
    /// Build an audit event.
    #[must_use]
    pub fn new(
        actor: UserId,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl std::fmt::Display,
        meta: serde_json::Value,
    ) -> Self {
        Self {
            actor,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            meta,
        }
    }
}

/// Append-only audit sink.
///
/// Invoked fire-and-forget after each transition: delivery failures are
/// logged and swallowed by the engine and never roll back the
/// transition they follow.
pub trait AuditSink: Send + Sync {
    /// Record one audit event.
    ///
    /// # Errors
    ///
    /// Returns error if the sink is unreachable. The engine treats this
    /// as non-fatal.
    fn record(&self, event: AuditEvent) -> impl Future<Output = Result<()>> + Send;
}
