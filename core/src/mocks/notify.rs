//! Capturing notification sink for tests.

use crate::error::{LifecycleError, Result};
use crate::providers::{Notification, Notifier};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Notifier that records notifications into a vector for assertions.
///
/// Can be told to fail, to verify delivery failures are swallowed.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Make subsequent `send` calls fail.
    pub fn fail_next(&self, fail: bool) {
        if let Ok(mut guard) = self.fail.lock() {
            *guard = fail;
        }
    }
}

impl Notifier for MockNotifier {
    fn send(&self, notification: Notification) -> impl Future<Output = Result<()>> + Send {
        let sent = Arc::clone(&self.sent);
        let fail = Arc::clone(&self.fail);

        async move {
            if fail.lock().map(|g| *g).unwrap_or(false) {
                return Err(LifecycleError::Database("notifier down".to_string()));
            }
            sent.lock()
                .map_err(|_| LifecycleError::Database("mutex poisoned".to_string()))?
                .push(notification);
            Ok(())
        }
    }
}
