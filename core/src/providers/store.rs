//! Data store trait for lifecycle entities.

use crate::domain::{
    Decision, Device, DeviceId, DeviceModel, ModelId, Repair, RepairId, RepairPrice, RepairStatus,
    RepairTypeId, ReplacementRequest, RequestId, SearchLogEntry, UserId, Warranty, WarrantyId,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Persistence for lifecycle entities.
///
/// # Atomicity contract
///
/// The conditional inserts and `resolve_request` are the enforcement
/// points for the per-device slot invariants (one active warranty, one
/// pending request, one open repair). An implementation must make each
/// of them a single atomic conditional write — a transaction plus
/// unique constraint, or a critical section — that re-verifies its
/// predicate at write time. Engine-side read-then-write alone is
/// race-prone and is only used for early, friendly errors.
pub trait LifecycleStore: Send + Sync {
    // ═══════════════════════════════════════════════════════════
    // Devices and models
    // ═══════════════════════════════════════════════════════════

    /// Point lookup by device id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_device(&self, id: DeviceId) -> impl Future<Output = Result<Option<Device>>> + Send;

    /// Lookup by alternate key: a normalized IMEI matching either the
    /// primary or the secondary IMEI slot.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_device_by_imei(
        &self,
        imei: &str,
    ) -> impl Future<Output = Result<Option<Device>>> + Send;

    /// Point lookup by model id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_model(&self, id: ModelId) -> impl Future<Output = Result<Option<DeviceModel>>> + Send;

    // ═══════════════════════════════════════════════════════════
    // Warranties
    // ═══════════════════════════════════════════════════════════

    /// The device's active warranty, if any.
    ///
    /// Must be strongly consistent relative to concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn active_warranty_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Warranty>>> + Send;

    /// Point lookup by warranty id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_warranty(
        &self,
        id: WarrantyId,
    ) -> impl Future<Output = Result<Option<Warranty>>> + Send;

    /// Conditional insert of an active warranty.
    ///
    /// Atomically re-verifies, then writes:
    /// - device exists → else `LifecycleError::DeviceNotFound`
    /// - device not replaced → else `LifecycleError::DeviceReplaced`
    /// - no active warranty for the device → else
    ///   `LifecycleError::WarrantyAlreadyActive` carrying the holding
    ///   store (the engine redacts it for non-admin callers)
    ///
    /// # Errors
    ///
    /// The typed conflicts above, or `Database` if the store fails.
    fn insert_warranty(
        &self,
        warranty: Warranty,
    ) -> impl Future<Output = Result<Warranty>> + Send;

    /// Active warranties activated by one store.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn list_active_warranties_for_store(
        &self,
        store_id: UserId,
    ) -> impl Future<Output = Result<Vec<Warranty>>> + Send;

    /// All active warranties (admin read).
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn list_active_warranties(&self) -> impl Future<Output = Result<Vec<Warranty>>> + Send;

    // ═══════════════════════════════════════════════════════════
    // Replacement requests
    // ═══════════════════════════════════════════════════════════

    /// The device's pending replacement request, if any.
    ///
    /// Must be strongly consistent relative to concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn pending_request_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<ReplacementRequest>>> + Send;

    /// Point lookup by request id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_request(
        &self,
        id: RequestId,
    ) -> impl Future<Output = Result<Option<ReplacementRequest>>> + Send;

    /// Conditional insert of a pending replacement request.
    ///
    /// Atomically re-verifies, then writes:
    /// - device exists and not replaced → else `DeviceNotFound` /
    ///   `DeviceReplaced`
    /// - no pending request for the device → else
    ///   `RequestAlreadyPending`
    ///
    /// When the request carries a `repair_id`, the linked repair moves
    /// to `ReplacementRequested` in the same atomic unit.
    ///
    /// # Errors
    ///
    /// The typed conflicts above, or `Database` if the store fails.
    fn insert_request(
        &self,
        request: ReplacementRequest,
    ) -> impl Future<Output = Result<ReplacementRequest>> + Send;

    /// Resolve a pending request.
    ///
    /// Compare-and-swap on `status == Pending`: a request that is not
    /// (or no longer) pending fails `RequestNotPending`, which is what
    /// makes double-resolution impossible under concurrency.
    ///
    /// On `Approve` the cascade is one atomic unit: request resolved,
    /// device marked replaced at `resolved_at`, associated warranty (if
    /// any) deactivated. Partial application is a correctness violation.
    /// On `Reject` only the request row changes.
    ///
    /// # Errors
    ///
    /// `RequestNotPending`, or `Database` if the store fails.
    fn resolve_request(
        &self,
        id: RequestId,
        decision: Decision,
        admin_notes: Option<String>,
        resolver: UserId,
        resolved_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<ReplacementRequest>> + Send;

    /// Pending requests awaiting adjudication (admin read).
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn list_pending_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<ReplacementRequest>>> + Send;

    // ═══════════════════════════════════════════════════════════
    // Repairs
    // ═══════════════════════════════════════════════════════════

    /// The device's open repair, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn open_repair_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Repair>>> + Send;

    /// Point lookup by repair id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn find_repair(&self, id: RepairId) -> impl Future<Output = Result<Option<Repair>>> + Send;

    /// Conditional insert of an open repair.
    ///
    /// Atomically re-verifies, then writes:
    /// - device exists and not replaced → else `DeviceNotFound` /
    ///   `DeviceReplaced`
    /// - no open repair for the device → else `RepairAlreadyOpen`
    ///
    /// # Errors
    ///
    /// The typed conflicts above, or `Database` if the store fails.
    fn insert_repair(&self, repair: Repair) -> impl Future<Output = Result<Repair>> + Send;

    /// Compare-and-swap a repair's status.
    ///
    /// Writes `to` (and `completed_at` when given) only if the current
    /// status still equals `from`; otherwise fails
    /// `InvalidRepairTransition` with the actual current status.
    ///
    /// # Errors
    ///
    /// `InvalidRepairTransition`, or `Database` if the store fails.
    fn update_repair_status(
        &self,
        id: RepairId,
        from: RepairStatus,
        to: RepairStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Repair>> + Send;

    /// Repairs owned by one lab, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn list_repairs_for_lab(
        &self,
        lab_id: UserId,
    ) -> impl Future<Output = Result<Vec<Repair>>> + Send;

    /// The lab's active price for a repair type, if one is set.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn repair_price(
        &self,
        lab_id: UserId,
        repair_type_id: RepairTypeId,
    ) -> impl Future<Output = Result<Option<RepairPrice>>> + Send;

    // ═══════════════════════════════════════════════════════════
    // Search log (quota ledger)
    // ═══════════════════════════════════════════════════════════

    /// Number of logged searches by a user since `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn count_searches_since(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Append one search log entry.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn append_search_log(
        &self,
        entry: SearchLogEntry,
    ) -> impl Future<Output = Result<()>> + Send;
}
