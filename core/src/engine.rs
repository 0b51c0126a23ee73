//! The lifecycle engine.
//!
//! Implements the warranty/replacement state machine as explicit,
//! invariant-checked transitions over an injected [`LifecycleStore`]:
//!
//! - IMEI search with a rolling per-user quota and role-sensitive
//!   redaction of customer data
//! - warranty activation (one active warranty per device, ever)
//! - replacement request creation (one pending request per device)
//! - admin approve/reject with an atomic approve cascade
//! - lab repair intake and status transitions
//!
//! Every "no existing X" precondition checked here is re-verified by
//! the store at write time, so concurrent requests racing on the same
//! device resolve to exactly one winner. The audit and notification
//! sinks are fire-and-forget: their failures are logged and swallowed,
//! never rolled back into the primary transition.

use crate::config::LifecycleConfig;
use crate::domain::{
    Decision, DeviceId, FaultType, Repair, RepairId, RepairStatus, RepairTypeId,
    ReplacementRequest, RequestId, RequestStatus, Role, SearchLogEntry, UserId, Warranty,
    WarrantyId, normalize_imei,
};
use crate::error::{LifecycleError, Result};
use crate::policy::can_view_warranty_details;
use crate::providers::{
    AuditEvent, AuditSink, Clock, LifecycleStore, Notification, NotificationKind, Notifier,
    Recipients,
};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Operation payloads
// ═══════════════════════════════════════════════════════════════════════

/// Warranty fields exposed by a search, post-redaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyView {
    /// Warranty identifier.
    pub warranty_id: WarrantyId,
    /// Customer name (withheld for foreign stores).
    pub customer_name: String,
    /// Customer phone (withheld for foreign stores).
    pub customer_phone: String,
    /// Coverage start.
    pub activation_date: DateTime<Utc>,
    /// Coverage end.
    pub expiry_date: DateTime<Utc>,
}

/// Result of an IMEI search.
///
/// `has_active_warranty` and `is_replaced` are visible to every role;
/// the customer-bearing `warranty` field is populated only when the
/// access policy allows it. Redaction is a confidentiality boundary,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSearchResult {
    /// Matched device.
    pub device_id: DeviceId,
    /// Primary IMEI.
    pub imei: String,
    /// Secondary IMEI, if dual-SIM.
    pub imei2: Option<String>,
    /// Model name, if the model row is known.
    pub model_name: Option<String>,
    /// Manufacturer, if known.
    pub manufacturer: Option<String>,
    /// Warranty term in months.
    pub warranty_months: u32,
    /// Whether the device has been replaced (terminal lockout).
    pub is_replaced: bool,
    /// When the device was replaced.
    pub replaced_at: Option<DateTime<Utc>>,
    /// Whether an active warranty exists, regardless of who holds it.
    pub has_active_warranty: bool,
    /// Whether the active warranty belongs to the requester's store.
    pub is_own_warranty: bool,
    /// Warranty details, present only when the policy permits.
    pub warranty: Option<WarrantyView>,
}

/// Receipt returned by a successful activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationReceipt {
    /// The new warranty.
    pub warranty_id: WarrantyId,
    /// Computed coverage end.
    pub expiry_date: DateTime<Utc>,
}

/// Intake parameters for a new repair.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairIntake {
    /// Device being brought in.
    pub device_id: DeviceId,
    /// Customer name taken at the counter.
    pub customer_name: String,
    /// Customer phone taken at the counter.
    pub customer_phone: String,
    /// Fault category, if identified.
    pub fault_type: Option<FaultType>,
    /// Free-form fault description.
    pub fault_description: Option<String>,
    /// Catalog or custom job.
    pub job: RepairJob,
}

/// What kind of repair job is being opened.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairJob {
    /// A catalog repair type; cost comes from the lab's price list.
    Catalog(RepairTypeId),
    /// A custom job with its own description and price.
    Custom {
        /// What the custom job is.
        description: String,
        /// Agreed price in agorot/cents.
        price: i64,
    },
}

/// Compute a warranty expiry date: activation plus a whole number of
/// calendar months, clamping to the last day of shorter months
/// (Jan 31 + 1 month lands on the last day of February).
///
/// # Errors
///
/// Returns `Database` on date overflow, which cannot happen for any
/// realistic activation date.
pub fn compute_expiry(activation: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    activation
        .checked_add_months(Months::new(months))
        .ok_or_else(|| LifecycleError::Database("expiry date overflow".to_string()))
}

/// Whether a lab-driven repair status transition is legal.
///
/// `ReplacementRequested` is never a legal target here; only the
/// replacement-request operation diverts a repair there.
#[must_use]
pub const fn is_valid_repair_transition(from: RepairStatus, to: RepairStatus) -> bool {
    matches!(
        (from, to),
        (RepairStatus::Received, RepairStatus::InProgress)
            | (RepairStatus::InProgress, RepairStatus::Completed)
            | (
                RepairStatus::Received | RepairStatus::InProgress,
                RepairStatus::Cancelled
            )
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════

/// The lifecycle engine.
///
/// All dependencies are injected, so the engine runs unchanged against
/// the in-memory mocks and against PostgreSQL.
///
/// # Type Parameters
///
/// - `S`: data store
/// - `A`: audit sink
/// - `N`: notification sink
/// - `C`: clock
#[derive(Clone)]
pub struct LifecycleEngine<S, A, N, C>
where
    S: LifecycleStore,
    A: AuditSink,
    N: Notifier,
    C: Clock,
{
    store: S,
    audit: A,
    notifier: N,
    clock: C,
    config: LifecycleConfig,
}

impl<S, A, N, C> LifecycleEngine<S, A, N, C>
where
    S: LifecycleStore,
    A: AuditSink,
    N: Notifier,
    C: Clock,
{
    /// Create an engine over the given providers.
    pub const fn new(store: S, audit: A, notifier: N, clock: C, config: LifecycleConfig) -> Self {
        Self {
            store,
            audit,
            notifier,
            clock,
            config,
        }
    }

    /// Direct access to the underlying store, for read paths the engine
    /// does not mediate (e.g. seeding in tests).
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ═══════════════════════════════════════════════════════════
    // Operation: search
    // ═══════════════════════════════════════════════════════════

    /// Search for a device by IMEI (either slot).
    ///
    /// Store and lab users are capped at `config.search_quota` lookups
    /// per rolling `config.quota_window`; a refused attempt is not
    /// logged and does not consume quota. Admins are exempt. Every
    /// performed lookup is logged with whether a device row matched,
    /// independent of warranty visibility.
    ///
    /// Read-only apart from the log append.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` when the rolling cap is hit
    /// - `DeviceNotFound` when no device matches (still logged)
    /// - `Database` on store failure
    pub async fn search_device_by_imei(
        &self,
        raw_imei: &str,
        requester_id: UserId,
        requester_role: Role,
    ) -> Result<DeviceSearchResult> {
        let imei = normalize_imei(raw_imei);
        let now = self.clock.now();

        if requester_role != Role::Admin {
            let cutoff = now - self.config.quota_window;
            let used = self.store.count_searches_since(requester_id, cutoff).await?;
            if used >= u64::from(self.config.search_quota) {
                tracing::debug!(user = %requester_id, used, "search quota exceeded");
                return Err(LifecycleError::QuotaExceeded {
                    limit: self.config.search_quota,
                });
            }
        }

        let device = self.store.find_device_by_imei(&imei).await?;

        let Some(device) = device else {
            self.store
                .append_search_log(SearchLogEntry {
                    user_id: requester_id,
                    search_term: imei,
                    device_found: false,
                    device_id: None,
                    created_at: now,
                })
                .await?;
            return Err(LifecycleError::DeviceNotFound);
        };

        self.store
            .append_search_log(SearchLogEntry {
                user_id: requester_id,
                search_term: imei,
                device_found: true,
                device_id: Some(device.id),
                created_at: now,
            })
            .await?;

        let model = self.store.find_model(device.model_id).await?;
        let active = self.store.active_warranty_for_device(device.id).await?;

        let (has_active_warranty, is_own_warranty, warranty) = match active {
            None => (false, false, None),
            Some(w) => {
                let own = w.store_id == requester_id;
                let view = can_view_warranty_details(&w, requester_id, requester_role).then(|| {
                    WarrantyView {
                        warranty_id: w.id,
                        customer_name: w.customer_name.clone(),
                        customer_phone: w.customer_phone.clone(),
                        activation_date: w.activation_date,
                        expiry_date: w.expiry_date,
                    }
                });
                (true, own, view)
            }
        };

        Ok(DeviceSearchResult {
            device_id: device.id,
            imei: device.imei,
            imei2: device.imei2,
            model_name: model.as_ref().map(|m| m.model_name.clone()),
            manufacturer: model.and_then(|m| m.manufacturer),
            warranty_months: device.warranty_months,
            is_replaced: device.is_replaced,
            replaced_at: device.replaced_at,
            has_active_warranty,
            is_own_warranty,
            warranty,
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Operation: activate warranty
    // ═══════════════════════════════════════════════════════════

    /// Activate a warranty on a device for the requesting store.
    ///
    /// The activating store becomes the immutable owner. Expiry is the
    /// activation date plus the device's warranty term in calendar
    /// months, clamped to month ends.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` for lab callers
    /// - `DeviceNotFound`, `DeviceReplaced`
    /// - `WarrantyAlreadyActive` (the holding store is disclosed to
    ///   admins only)
    /// - `Database` on store failure
    pub async fn activate_warranty(
        &self,
        device_id: DeviceId,
        customer_name: &str,
        customer_phone: &str,
        requester_id: UserId,
        requester_role: Role,
    ) -> Result<ActivationReceipt> {
        if requester_role == Role::Lab {
            return Err(LifecycleError::InsufficientRole);
        }

        let device = self
            .store
            .find_device(device_id)
            .await?
            .ok_or(LifecycleError::DeviceNotFound)?;
        if device.is_replaced {
            return Err(LifecycleError::DeviceReplaced);
        }

        // Early, friendly check. The store re-verifies at write time.
        if let Some(existing) = self.store.active_warranty_for_device(device_id).await? {
            return Err(Self::redact_holder(
                LifecycleError::WarrantyAlreadyActive {
                    store_id: Some(existing.store_id),
                },
                requester_role,
            ));
        }

        let now = self.clock.now();
        let expiry = compute_expiry(now, device.warranty_months)?;

        let warranty = Warranty {
            id: WarrantyId::new(),
            device_id,
            store_id: requester_id,
            activated_by: Some(requester_id),
            customer_name: customer_name.to_string(),
            customer_phone: customer_phone.to_string(),
            activation_date: now,
            expiry_date: expiry,
            is_active: true,
            notes: None,
        };

        let warranty = self
            .store
            .insert_warranty(warranty)
            .await
            .map_err(|e| Self::redact_holder(e, requester_role))?;

        tracing::info!(
            warranty = %warranty.id,
            device = %device_id,
            store = %requester_id,
            expiry = %warranty.expiry_date,
            "warranty activated"
        );

        self.record_audit(AuditEvent::new(
            requester_id,
            "warranty.activate",
            "warranty",
            warranty.id,
            serde_json::json!({
                "device_id": device_id,
                "expiry_date": warranty.expiry_date,
            }),
        ))
        .await;

        Ok(ActivationReceipt {
            warranty_id: warranty.id,
            expiry_date: warranty.expiry_date,
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Operation: create replacement request
    // ═══════════════════════════════════════════════════════════

    /// Raise a replacement request for a device.
    ///
    /// The requester must hold a legitimate relationship to the device:
    /// the active warranty for stores, an open repair for labs. Customer
    /// details are snapshotted from that relationship. When the request
    /// comes out of a repair, the repair diverts to
    /// `ReplacementRequested` in the same atomic write.
    ///
    /// # Errors
    ///
    /// - `ReasonTooShort`
    /// - `DeviceNotFound`, `DeviceReplaced`
    /// - `RequestAlreadyPending`
    /// - `NotAuthorizedForDevice`
    /// - `Database` on store failure
    pub async fn create_replacement_request(
        &self,
        device_id: DeviceId,
        reason: &str,
        requester_id: UserId,
        requester_role: Role,
        repair_id: Option<RepairId>,
    ) -> Result<ReplacementRequest> {
        let reason = reason.trim();
        if reason.chars().count() < self.config.min_reason_len {
            return Err(LifecycleError::ReasonTooShort {
                min: self.config.min_reason_len,
            });
        }

        let device = self
            .store
            .find_device(device_id)
            .await?
            .ok_or(LifecycleError::DeviceNotFound)?;
        if device.is_replaced {
            return Err(LifecycleError::DeviceReplaced);
        }

        if self
            .store
            .pending_request_for_device(device_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::RequestAlreadyPending);
        }

        let active_warranty = self.store.active_warranty_for_device(device_id).await?;
        let (linked_repair, customer) = self
            .resolve_relationship(device_id, requester_id, requester_role, repair_id, &active_warranty)
            .await?;

        let request = ReplacementRequest {
            id: RequestId::new(),
            device_id,
            warranty_id: active_warranty.map(|w| w.id),
            repair_id: linked_repair,
            requester_id,
            reason: reason.to_string(),
            customer_name: customer.0,
            customer_phone: customer.1,
            status: RequestStatus::Pending,
            admin_notes: None,
            resolved_by: None,
            resolved_at: None,
            created_at: self.clock.now(),
        };

        let request = self.store.insert_request(request).await?;

        tracing::info!(
            request = %request.id,
            device = %device_id,
            requester = %requester_id,
            "replacement request created"
        );

        self.record_audit(AuditEvent::new(
            requester_id,
            "replacement.request",
            "replacement_request",
            request.id,
            serde_json::json!({ "device_id": device_id, "reason": request.reason }),
        ))
        .await;

        self.deliver(Notification {
            recipients: Recipients::Admins,
            title: "Replacement requested".to_string(),
            message: format!("A replacement was requested: {}", request.reason),
            kind: NotificationKind::ReplacementRequested,
            data: serde_json::json!({ "request_id": request.id, "device_id": device_id }),
        })
        .await;

        Ok(request)
    }

    /// Determine the requester's relationship to the device and the
    /// customer snapshot it yields.
    async fn resolve_relationship(
        &self,
        device_id: DeviceId,
        requester_id: UserId,
        requester_role: Role,
        repair_id: Option<RepairId>,
        active_warranty: &Option<Warranty>,
    ) -> Result<(Option<RepairId>, (String, String))> {
        match requester_role {
            Role::Store => match active_warranty {
                Some(w) if w.store_id == requester_id => {
                    Ok((None, (w.customer_name.clone(), w.customer_phone.clone())))
                }
                _ => Err(LifecycleError::NotAuthorizedForDevice),
            },
            Role::Lab => {
                let repair = match repair_id {
                    Some(id) => self.store.find_repair(id).await?,
                    None => self.store.open_repair_for_device(device_id).await?,
                };
                match repair {
                    Some(r)
                        if r.lab_id == requester_id
                            && r.device_id == device_id
                            && r.status.is_open() =>
                    {
                        Ok((Some(r.id), (r.customer_name, r.customer_phone)))
                    }
                    _ => Err(LifecycleError::NotAuthorizedForDevice),
                }
            }
            Role::Admin => {
                // Admins may raise a request on any device that carries a
                // customer context to snapshot from.
                if let Some(w) = active_warranty {
                    return Ok((None, (w.customer_name.clone(), w.customer_phone.clone())));
                }
                match self.store.open_repair_for_device(device_id).await? {
                    Some(r) => Ok((Some(r.id), (r.customer_name, r.customer_phone))),
                    None => Err(LifecycleError::NotAuthorizedForDevice),
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Operation: resolve replacement request
    // ═══════════════════════════════════════════════════════════

    /// Approve or reject a pending replacement request.
    ///
    /// Approval cascades atomically: request resolved, device marked
    /// replaced, warranty deactivated — all three or none. Rejection
    /// touches only the request and requires admin notes.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` for non-admin callers
    /// - `RequestNotPending` on double-resolution
    /// - `NotesRequiredForRejection`
    /// - `Database` on store failure
    pub async fn resolve_replacement_request(
        &self,
        request_id: RequestId,
        decision: Decision,
        admin_notes: Option<&str>,
        resolver_id: UserId,
        resolver_role: Role,
    ) -> Result<ReplacementRequest> {
        if resolver_role != Role::Admin {
            return Err(LifecycleError::InsufficientRole);
        }

        let notes = admin_notes.map(str::trim).filter(|n| !n.is_empty());
        if decision == Decision::Reject && notes.is_none() {
            return Err(LifecycleError::NotesRequiredForRejection);
        }

        let resolved_at = self.clock.now();
        let request = self
            .store
            .resolve_request(
                request_id,
                decision,
                notes.map(ToString::to_string),
                resolver_id,
                resolved_at,
            )
            .await?;

        let action = match decision {
            Decision::Approve => "replacement.approve",
            Decision::Reject => "replacement.reject",
        };
        tracing::info!(
            request = %request.id,
            device = %request.device_id,
            resolver = %resolver_id,
            action,
            "replacement request resolved"
        );

        self.record_audit(AuditEvent::new(
            resolver_id,
            action,
            "replacement_request",
            request.id,
            serde_json::json!({
                "device_id": request.device_id,
                "admin_notes": request.admin_notes,
            }),
        ))
        .await;

        let (kind, title) = match decision {
            Decision::Approve => (
                NotificationKind::ReplacementApproved,
                "Replacement approved",
            ),
            Decision::Reject => (NotificationKind::ReplacementRejected, "Replacement rejected"),
        };
        self.deliver(Notification {
            recipients: Recipients::User(request.requester_id),
            title: title.to_string(),
            message: request
                .admin_notes
                .clone()
                .unwrap_or_else(|| title.to_string()),
            kind,
            data: serde_json::json!({ "request_id": request.id, "device_id": request.device_id }),
        })
        .await;

        Ok(request)
    }

    // ═══════════════════════════════════════════════════════════
    // Operation: repair intake
    // ═══════════════════════════════════════════════════════════

    /// Open a repair for a device at the requesting lab.
    ///
    /// At most one open repair exists per device. Catalog jobs take
    /// their cost from the lab's price list (left unset when the lab
    /// has no price for the type); custom jobs carry their own price.
    /// The device's active warranty, if any, is linked.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` for non-lab callers
    /// - `DeviceNotFound`, `DeviceReplaced`
    /// - `RepairAlreadyOpen`
    /// - `Database` on store failure
    pub async fn intake_repair(
        &self,
        intake: RepairIntake,
        lab_id: UserId,
        requester_role: Role,
    ) -> Result<Repair> {
        if requester_role != Role::Lab {
            return Err(LifecycleError::InsufficientRole);
        }

        let device = self
            .store
            .find_device(intake.device_id)
            .await?
            .ok_or(LifecycleError::DeviceNotFound)?;
        if device.is_replaced {
            return Err(LifecycleError::DeviceReplaced);
        }

        if self
            .store
            .open_repair_for_device(intake.device_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::RepairAlreadyOpen);
        }

        let (repair_type_id, custom_repair_description, cost) = match intake.job {
            RepairJob::Catalog(type_id) => {
                let price = self.store.repair_price(lab_id, type_id).await?;
                (Some(type_id), None, price.map(|p| p.price))
            }
            RepairJob::Custom { description, price } => (None, Some(description), Some(price)),
        };

        let warranty = self
            .store
            .active_warranty_for_device(intake.device_id)
            .await?;

        let repair = Repair {
            id: RepairId::new(),
            device_id: intake.device_id,
            lab_id,
            warranty_id: warranty.map(|w| w.id),
            status: RepairStatus::Received,
            customer_name: intake.customer_name,
            customer_phone: intake.customer_phone,
            fault_type: intake.fault_type,
            fault_description: intake.fault_description,
            repair_type_id,
            custom_repair_description,
            cost,
            created_at: self.clock.now(),
            completed_at: None,
        };

        let repair = self.store.insert_repair(repair).await?;

        tracing::info!(repair = %repair.id, device = %repair.device_id, lab = %lab_id, "repair opened");

        self.record_audit(AuditEvent::new(
            lab_id,
            "repair.intake",
            "repair",
            repair.id,
            serde_json::json!({ "device_id": repair.device_id, "cost": repair.cost }),
        ))
        .await;

        Ok(repair)
    }

    /// Move a repair along `received → in_progress → completed`, or
    /// cancel it from any open state.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` unless the owning lab (or an admin) calls
    /// - `DeviceNotFound` when the repair id is unknown
    /// - `InvalidRepairTransition` for illegal jumps, including any
    ///   attempt to set `ReplacementRequested` directly
    /// - `Database` on store failure
    pub async fn update_repair_status(
        &self,
        repair_id: RepairId,
        to: RepairStatus,
        requester_id: UserId,
        requester_role: Role,
    ) -> Result<Repair> {
        let repair = self
            .store
            .find_repair(repair_id)
            .await?
            .ok_or(LifecycleError::DeviceNotFound)?;

        let owns = requester_role == Role::Lab && repair.lab_id == requester_id;
        if !(owns || requester_role == Role::Admin) {
            return Err(LifecycleError::InsufficientRole);
        }

        if !is_valid_repair_transition(repair.status, to) {
            return Err(LifecycleError::InvalidRepairTransition {
                from: repair.status,
                to,
            });
        }

        let completed_at = (to == RepairStatus::Completed).then(|| self.clock.now());
        let updated = self
            .store
            .update_repair_status(repair_id, repair.status, to, completed_at)
            .await?;

        self.record_audit(AuditEvent::new(
            requester_id,
            "repair.status",
            "repair",
            repair_id,
            serde_json::json!({ "from": repair.status, "to": to }),
        ))
        .await;

        Ok(updated)
    }

    // ═══════════════════════════════════════════════════════════
    // Read projections
    // ═══════════════════════════════════════════════════════════

    /// Active warranties visible to the viewer: all of them for admins,
    /// the store's own for stores.
    ///
    /// # Errors
    ///
    /// `InsufficientRole` for labs; `Database` on store failure.
    pub async fn list_active_warranties(
        &self,
        viewer_id: UserId,
        viewer_role: Role,
    ) -> Result<Vec<Warranty>> {
        match viewer_role {
            Role::Admin => self.store.list_active_warranties().await,
            Role::Store => self.store.list_active_warranties_for_store(viewer_id).await,
            Role::Lab => Err(LifecycleError::InsufficientRole),
        }
    }

    /// Pending replacement requests (admin read).
    ///
    /// # Errors
    ///
    /// `InsufficientRole` for non-admins; `Database` on store failure.
    pub async fn list_pending_requests(
        &self,
        viewer_role: Role,
    ) -> Result<Vec<ReplacementRequest>> {
        if viewer_role != Role::Admin {
            return Err(LifecycleError::InsufficientRole);
        }
        self.store.list_pending_requests().await
    }

    /// Repairs owned by a lab, for the lab itself or an admin.
    ///
    /// # Errors
    ///
    /// `InsufficientRole` for other viewers; `Database` on store failure.
    pub async fn list_repairs_for_lab(
        &self,
        lab_id: UserId,
        viewer_id: UserId,
        viewer_role: Role,
    ) -> Result<Vec<Repair>> {
        let allowed = viewer_role == Role::Admin
            || (viewer_role == Role::Lab && viewer_id == lab_id);
        if !allowed {
            return Err(LifecycleError::InsufficientRole);
        }
        self.store.list_repairs_for_lab(lab_id).await
    }

    /// One replacement request, for an admin or its original requester.
    ///
    /// # Errors
    ///
    /// `NotAuthorizedForDevice` for other viewers, `DeviceNotFound` when
    /// the id is unknown; `Database` on store failure.
    pub async fn get_request(
        &self,
        request_id: RequestId,
        viewer_id: UserId,
        viewer_role: Role,
    ) -> Result<ReplacementRequest> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(LifecycleError::DeviceNotFound)?;
        if viewer_role != Role::Admin && request.requester_id != viewer_id {
            return Err(LifecycleError::NotAuthorizedForDevice);
        }
        Ok(request)
    }

    // ═══════════════════════════════════════════════════════════
    // Fire-and-forget sinks
    // ═══════════════════════════════════════════════════════════

    /// The holding store in `WarrantyAlreadyActive` is admin-only.
    fn redact_holder(err: LifecycleError, role: Role) -> LifecycleError {
        match err {
            LifecycleError::WarrantyAlreadyActive { .. } if role != Role::Admin => {
                LifecycleError::WarrantyAlreadyActive { store_id: None }
            }
            other => other,
        }
    }

    async fn record_audit(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(error = %err, "audit sink failed; transition unaffected");
        }
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(err) = self.notifier.send(notification).await {
            tracing::warn!(error = %err, "notification delivery failed; transition unaffected");
        }
    }
}
