//! Notification sink trait.

use crate::domain::UserId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Who a notification goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipients {
    /// All admin users.
    Admins,
    /// One specific user.
    User(UserId),
}

/// Category of a notification, for client-side rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A replacement request awaits adjudication.
    ReplacementRequested,
    /// A replacement request was approved.
    ReplacementApproved,
    /// A replacement request was rejected.
    ReplacementRejected,
}

/// One notification event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Target audience.
    pub recipients: Recipients,
    /// Short title.
    pub title: String,
    /// Human-readable body.
    pub message: String,
    /// Category.
    pub kind: NotificationKind,
    /// Structured payload (entity ids and the like).
    pub data: serde_json::Value,
}

/// Notification delivery sink.
///
/// At-most-once, best-effort: the engine logs and swallows delivery
/// failures, which never surface as operation failures.
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns error if delivery fails. The engine treats this as
    /// non-fatal.
    fn send(&self, notification: Notification) -> impl Future<Output = Result<()>> + Send;
}
