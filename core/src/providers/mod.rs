//! Provider traits for the lifecycle engine.
//!
//! These traits are **interfaces**, not implementations. The engine
//! depends on them, and the host wires in concrete implementations:
//! in-memory mocks for tests, `warrantydesk-postgres` for production.
//!
//! The store is the only shared mutable resource in the system. Every
//! "no existing X" precondition the engine checks on the read side is
//! re-verified by the store at write time (compare-and-swap), so two
//! requests racing on the same device cannot both win a slot.

pub mod audit;
pub mod clock;
pub mod notify;
pub mod store;

pub use audit::{AuditEvent, AuditSink};
pub use clock::{Clock, SystemClock};
pub use notify::{Notification, NotificationKind, Notifier, Recipients};
pub use store::LifecycleStore;
