//! Capturing audit sink for tests.

use crate::error::{LifecycleError, Result};
use crate::providers::{AuditEvent, AuditSink};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Audit sink that records events into a vector for assertions.
///
/// Can be told to fail, to verify that sink failures never roll back
/// the transition they follow.
#[derive(Debug, Clone, Default)]
pub struct MockAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Make subsequent `record` calls fail.
    pub fn fail_next(&self, fail: bool) {
        if let Ok(mut guard) = self.fail.lock() {
            *guard = fail;
        }
    }
}

impl AuditSink for MockAuditSink {
    fn record(&self, event: AuditEvent) -> impl Future<Output = Result<()>> + Send {
        let events = Arc::clone(&self.events);
        let fail = Arc::clone(&self.fail);

        async move {
            if fail.lock().map(|g| *g).unwrap_or(false) {
                return Err(LifecycleError::Database("audit sink down".to_string()));
            }
            events
                .lock()
                .map_err(|_| LifecycleError::Database("mutex poisoned".to_string()))?
                .push(event);
            Ok(())
        }
    }
}
