//! # WarrantyDesk Core
//!
//! The warranty/replacement lifecycle engine for a device back office:
//! an explicit, unit-testable state machine over devices, warranties,
//! repairs, and replacement requests.
//!
//! ## Invariants
//!
//! - At most one **active warranty** per device, ever.
//! - At most one **pending replacement request** per device.
//! - At most one **open repair** per device.
//! - A **replaced device** is terminally locked out of the lifecycle.
//! - Store/lab users get at most 50 IMEI searches per rolling day.
//! - A store sees only its own warranties' customer data.
//!
//! All invariants are re-verified by the data store at write time
//! (compare-and-swap), so they hold under concurrent requests for the
//! same device.
//!
//! ## Architecture
//!
//! ```text
//! caller → LifecycleEngine operation → access policy check
//!        → LifecycleStore read/write (atomic conditional)
//!        → audit/notification sink (best-effort)
//!        → typed result back to the caller
//! ```
//!
//! Business-rule violations come back as [`LifecycleError`] values,
//! never as panics; only infrastructure failures are opaque.
//!
//! ## Example
//!
//! ```
//! use warrantydesk_core::config::LifecycleConfig;
//! use warrantydesk_core::domain::{Device, DeviceId, ModelId, Role, UserId};
//! use warrantydesk_core::engine::LifecycleEngine;
//! use warrantydesk_core::mocks::{FixedClock, MemoryLifecycleStore, MockAuditSink, MockNotifier};
//! use chrono::Utc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> warrantydesk_core::Result<()> {
//! let store = MemoryLifecycleStore::new();
//! let device_id = DeviceId::new();
//! store.seed_device(Device {
//!     id: device_id,
//!     imei: "356880041234567".into(),
//!     imei2: None,
//!     model_id: ModelId::new(),
//!     warranty_months: 12,
//!     is_replaced: false,
//!     replaced_at: None,
//!     import_batch: None,
//!     imported_by: None,
//!     notes: None,
//! });
//!
//! let engine = LifecycleEngine::new(
//!     store,
//!     MockAuditSink::new(),
//!     MockNotifier::new(),
//!     FixedClock::new(Utc::now()),
//!     LifecycleConfig::default(),
//! );
//!
//! let store_user = UserId::new();
//! let receipt = engine
//!     .activate_warranty(device_id, "Yossi", "0501234567", store_user, Role::Store)
//!     .await?;
//! assert!(receipt.expiry_date > Utc::now());
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod policy;
pub mod providers;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::LifecycleConfig;
pub use engine::{ActivationReceipt, DeviceSearchResult, LifecycleEngine, RepairIntake, RepairJob};
pub use error::{LifecycleError, Result};
