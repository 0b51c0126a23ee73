//! Lifecycle engine configuration.
//!
//! Tunables live here so tests and deployments can adjust them without
//! touching the engine; defaults match the production rules.

use chrono::Duration;

/// Default search quota per rolling day.
pub const DEFAULT_SEARCH_QUOTA: u32 = 50;

/// Default minimum replacement-reason length.
pub const DEFAULT_MIN_REASON_LEN: usize = 5;

/// Lifecycle engine configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// IMEI searches allowed per user within the rolling window.
    ///
    /// Default: 50
    pub search_quota: u32,

    /// Rolling window for quota accounting.
    ///
    /// Default: 24 hours
    pub quota_window: Duration,

    /// Minimum replacement-reason length in characters.
    ///
    /// Default: 5 (the UI may enforce stricter)
    pub min_reason_len: usize,
}

impl LifecycleConfig {
    /// Create a configuration with production defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search_quota: DEFAULT_SEARCH_QUOTA,
            quota_window: Duration::hours(24),
            min_reason_len: DEFAULT_MIN_REASON_LEN,
        }
    }

    /// Set the search quota.
    #[must_use]
    pub const fn with_search_quota(mut self, quota: u32) -> Self {
        self.search_quota = quota;
        self
    }

    /// Set the quota window.
    #[must_use]
    pub const fn with_quota_window(mut self, window: Duration) -> Self {
        self.quota_window = window;
        self
    }

    /// Set the minimum reason length.
    #[must_use]
    pub const fn with_min_reason_len(mut self, len: usize) -> Self {
        self.min_reason_len = len;
        self
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::new()
    }
}
