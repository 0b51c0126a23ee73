//! In-memory provider implementations for testing.
//!
//! These run the full engine at memory speed with the same atomicity
//! contract as the PostgreSQL store: every conditional write happens
//! under one lock, so the concurrency properties can be exercised
//! without a database.

pub mod audit;
pub mod clock;
pub mod notify;
pub mod store;

pub use audit::MockAuditSink;
pub use clock::FixedClock;
pub use notify::MockNotifier;
pub use store::MemoryLifecycleStore;
