//! Clock trait - abstracts time for testability.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// The engine never calls `Utc::now()` directly; expiry arithmetic and
/// quota windows are only testable with an injectable clock.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
