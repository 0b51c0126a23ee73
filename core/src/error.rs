//! Error types for lifecycle operations.

use crate::domain::{RepairStatus, UserId};
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Error taxonomy for the warranty/replacement lifecycle.
///
/// Business-rule failures are expected outcomes and are returned as
/// values, never panicked. Only `Database` represents an infrastructure
/// failure the caller should treat as a generic error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    // ═══════════════════════════════════════════════════════════
    // Search
    // ═══════════════════════════════════════════════════════════

    /// Rolling 24-hour search quota hit. The refused attempt is not logged.
    #[error("Search quota exceeded ({limit} searches per rolling day)")]
    QuotaExceeded {
        /// The quota that was hit.
        limit: u32,
    },

    /// No device matches the IMEI (either slot).
    #[error("No device matches this IMEI")]
    DeviceNotFound,

    // ═══════════════════════════════════════════════════════════
    // Activation / replacement guards
    // ═══════════════════════════════════════════════════════════

    /// Action attempted on a device already marked replaced.
    #[error("Device has been replaced and is locked out of the lifecycle")]
    DeviceReplaced,

    /// An active warranty already exists for the device.
    ///
    /// `store_id` names the holding store only when the caller is admin;
    /// non-admin callers must not learn which store holds it.
    #[error("An active warranty already exists for this device")]
    WarrantyAlreadyActive {
        /// The store holding the active warranty (admin callers only).
        store_id: Option<UserId>,
    },

    /// A replacement request is already pending for the device.
    #[error("A replacement request is already pending for this device")]
    RequestAlreadyPending,

    /// Requester has no warranty or repair relationship to the device.
    #[error("Requester has no warranty or repair relationship to this device")]
    NotAuthorizedForDevice,

    /// Replacement reason is shorter than the domain minimum.
    #[error("Replacement reason must be at least {min} characters")]
    ReasonTooShort {
        /// Minimum accepted reason length.
        min: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Resolution
    // ═══════════════════════════════════════════════════════════

    /// Resolving a request that is not (or no longer) pending.
    #[error("Replacement request is not pending")]
    RequestNotPending,

    /// Rejection submitted without admin notes.
    #[error("Admin notes are required when rejecting a request")]
    NotesRequiredForRejection,

    // ═══════════════════════════════════════════════════════════
    // Repairs
    // ═══════════════════════════════════════════════════════════

    /// The device already has an open repair.
    #[error("Device already has an open repair")]
    RepairAlreadyOpen,

    /// Illegal repair status transition.
    #[error("Repair cannot move from {from:?} to {to:?}")]
    InvalidRepairTransition {
        /// Current status.
        from: RepairStatus,
        /// Requested status.
        to: RepairStatus,
    },

    /// Caller's role is not allowed to perform the operation.
    #[error("Operation not permitted for this role")]
    InsufficientRole,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// Data store operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl LifecycleError {
    /// Returns `true` for expected business-rule failures.
    ///
    /// These carry a distinct, user-presentable reason. Everything else
    /// is infrastructure and should surface as a generic failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use warrantydesk_core::LifecycleError;
    /// assert!(LifecycleError::DeviceReplaced.is_business_rule());
    /// assert!(!LifecycleError::Database("down".into()).is_business_rule());
    /// ```
    #[must_use]
    pub const fn is_business_rule(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}
