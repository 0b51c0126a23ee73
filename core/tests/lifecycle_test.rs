//! End-to-end lifecycle tests against the in-memory store.
//!
//! Walks the full warranty/replacement lifecycle and pins down every
//! business-rule failure kind. Tests assert on the error kind, not the
//! message text.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use chrono::{TimeZone, Utc};
use warrantydesk_core::config::LifecycleConfig;
use warrantydesk_core::domain::{
    Decision, Device, DeviceId, DeviceModel, ModelId, RepairStatus, RequestStatus, Role, UserId,
};
use warrantydesk_core::engine::{LifecycleEngine, RepairIntake, RepairJob};
use warrantydesk_core::mocks::{FixedClock, MemoryLifecycleStore, MockAuditSink, MockNotifier};
use warrantydesk_core::{LifecycleError, providers::LifecycleStore};

type TestEngine = LifecycleEngine<MemoryLifecycleStore, MockAuditSink, MockNotifier, FixedClock>;

struct Harness {
    engine: TestEngine,
    store: MemoryLifecycleStore,
    audit: MockAuditSink,
    notifier: MockNotifier,
    clock: FixedClock,
    device_id: DeviceId,
}

/// One device (12-month model) and an engine over fresh mocks, with the
/// clock frozen at 2024-01-31 10:00 UTC.
fn harness() -> Harness {
    let store = MemoryLifecycleStore::new();
    let model_id = ModelId::new();
    store.seed_model(DeviceModel {
        id: model_id,
        model_name: "Galaxy A54".to_string(),
        manufacturer: Some("Samsung".to_string()),
        warranty_months: 12,
        is_active: true,
    });
    let device_id = DeviceId::new();
    store.seed_device(Device {
        id: device_id,
        imei: "356880041234567".to_string(),
        imei2: Some("356880041234568".to_string()),
        model_id,
        warranty_months: 12,
        is_replaced: false,
        replaced_at: None,
        import_batch: None,
        imported_by: None,
        notes: None,
    });

    let audit = MockAuditSink::new();
    let notifier = MockNotifier::new();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 31, 10, 0, 0).unwrap());
    let engine = LifecycleEngine::new(
        store.clone(),
        audit.clone(),
        notifier.clone(),
        clock.clone(),
        LifecycleConfig::default(),
    );

    Harness {
        engine,
        store,
        audit,
        notifier,
        clock,
        device_id,
    }
}

fn cracked_screen_intake(device_id: DeviceId) -> RepairIntake {
    RepairIntake {
        device_id,
        customer_name: "Yossi".to_string(),
        customer_phone: "0501234567".to_string(),
        fault_type: None,
        fault_description: Some("cracked screen".to_string()),
        job: RepairJob::Custom {
            description: "screen swap".to_string(),
            price: 45000,
        },
    }
}

#[tokio::test]
async fn full_scenario_activation_to_replacement() {
    let h = harness();
    let store_a = UserId::new();
    let store_b = UserId::new();
    let lab = UserId::new();
    let admin = UserId::new();

    // Store A activates on 2024-01-31; 12 months land on 2025-01-31.
    let receipt = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .expect("first activation succeeds");
    assert_eq!(
        receipt.expiry_date,
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    );

    // Store A retries: rejected, and the holder is not disclosed.
    let err = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::WarrantyAlreadyActive { store_id: None });

    // Store B sees coverage but no customer data.
    let result = h
        .engine
        .search_device_by_imei("356880041234567", store_b, Role::Store)
        .await
        .expect("search succeeds");
    assert!(result.has_active_warranty);
    assert!(!result.is_own_warranty);
    assert!(result.warranty.is_none());

    // Lab opens a repair, then diverts it into a replacement request.
    let repair = h
        .engine
        .intake_repair(cracked_screen_intake(h.device_id), lab, Role::Lab)
        .await
        .expect("intake succeeds");
    let request = h
        .engine
        .create_replacement_request(h.device_id, "cracked screen", lab, Role::Lab, Some(repair.id))
        .await
        .expect("request succeeds");
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.repair_id, Some(repair.id));

    // The linked repair diverted in the same write.
    let diverted = h.store.find_repair(repair.id).await.unwrap().unwrap();
    assert_eq!(diverted.status, RepairStatus::ReplacementRequested);

    // Admin approves: request, device, and warranty all flip.
    let resolved = h
        .engine
        .resolve_replacement_request(
            request.id,
            Decision::Approve,
            Some("confirmed defect"),
            admin,
            Role::Admin,
        )
        .await
        .expect("approval succeeds");
    assert_eq!(resolved.status, RequestStatus::Approved);
    assert_eq!(resolved.resolved_by, Some(admin));

    let device = h.store.find_device(h.device_id).await.unwrap().unwrap();
    assert!(device.is_replaced);
    assert!(device.replaced_at.is_some());

    let warranty = h
        .store
        .find_warranty(receipt.warranty_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!warranty.is_active);

    // The replaced device is terminally locked out.
    let err = h
        .engine
        .create_replacement_request(h.device_id, "still broken", store_a, Role::Store, None)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::DeviceReplaced);

    let err = h
        .engine
        .activate_warranty(h.device_id, "Dana", "0529876543", store_b, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::DeviceReplaced);
}

#[tokio::test]
async fn admin_sees_which_store_holds_the_warranty() {
    let h = harness();
    let store_a = UserId::new();
    let admin = UserId::new();

    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();

    let err = h
        .engine
        .activate_warranty(h.device_id, "Dana", "0529876543", admin, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::WarrantyAlreadyActive {
            store_id: Some(store_a)
        }
    );
}

#[tokio::test]
async fn lab_cannot_activate() {
    let h = harness();
    let err = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", UserId::new(), Role::Lab)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::InsufficientRole);
}

#[tokio::test]
async fn reason_must_meet_minimum_length() {
    let h = harness();
    let store_a = UserId::new();
    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();

    let err = h
        .engine
        .create_replacement_request(h.device_id, "bad", store_a, Role::Store, None)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::ReasonTooShort { min: 5 });
}

#[tokio::test]
async fn duplicate_pending_request_is_rejected() {
    let h = harness();
    let store_a = UserId::new();
    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();

    h.engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();
    let err = h
        .engine
        .create_replacement_request(h.device_id, "still does not power on", store_a, Role::Store, None)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::RequestAlreadyPending);
}

#[tokio::test]
async fn foreign_store_cannot_request_replacement() {
    let h = harness();
    let store_a = UserId::new();
    let store_b = UserId::new();
    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();

    let err = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_b, Role::Store, None)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::NotAuthorizedForDevice);
}

#[tokio::test]
async fn lab_needs_an_open_repair_to_request() {
    let h = harness();
    let lab = UserId::new();

    let err = h
        .engine
        .create_replacement_request(h.device_id, "cracked screen", lab, Role::Lab, None)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::NotAuthorizedForDevice);
}

#[tokio::test]
async fn rejection_requires_notes_and_is_non_destructive() {
    let h = harness();
    let store_a = UserId::new();
    let admin = UserId::new();

    let receipt = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    let request = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();

    // Missing and blank notes both fail.
    let err = h
        .engine
        .resolve_replacement_request(request.id, Decision::Reject, None, admin, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::NotesRequiredForRejection);
    let err = h
        .engine
        .resolve_replacement_request(request.id, Decision::Reject, Some("   "), admin, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::NotesRequiredForRejection);

    let resolved = h
        .engine
        .resolve_replacement_request(
            request.id,
            Decision::Reject,
            Some("no defect found"),
            admin,
            Role::Admin,
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, RequestStatus::Rejected);

    // Device and warranty are untouched.
    let device = h.store.find_device(h.device_id).await.unwrap().unwrap();
    assert!(!device.is_replaced);
    let warranty = h
        .store
        .find_warranty(receipt.warranty_id)
        .await
        .unwrap()
        .unwrap();
    assert!(warranty.is_active);

    // The slot is free again after the rejection.
    h.engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .expect("new request after rejection succeeds");
}

#[tokio::test]
async fn double_resolution_fails() {
    let h = harness();
    let store_a = UserId::new();
    let admin = UserId::new();

    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    let request = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();

    h.engine
        .resolve_replacement_request(
            request.id,
            Decision::Approve,
            Some("confirmed"),
            admin,
            Role::Admin,
        )
        .await
        .unwrap();
    let err = h
        .engine
        .resolve_replacement_request(
            request.id,
            Decision::Reject,
            Some("changed my mind"),
            admin,
            Role::Admin,
        )
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::RequestNotPending);
}

#[tokio::test]
async fn only_admins_resolve() {
    let h = harness();
    let store_a = UserId::new();
    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    let request = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();

    let err = h
        .engine
        .resolve_replacement_request(
            request.id,
            Decision::Approve,
            Some("self-approval"),
            store_a,
            Role::Store,
        )
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::InsufficientRole);
}

#[tokio::test]
async fn sink_failures_never_abort_the_transition() {
    let h = harness();
    let store_a = UserId::new();

    h.audit.fail_next(true);
    h.notifier.fail_next(true);

    let receipt = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .expect("activation survives sink failures");

    let warranty = h
        .store
        .find_warranty(receipt.warranty_id)
        .await
        .unwrap()
        .unwrap();
    assert!(warranty.is_active);

    let request = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .expect("request survives sink failures");
    assert_eq!(request.status, RequestStatus::Pending);
}

#[tokio::test]
async fn transitions_are_audited_and_notified() {
    let h = harness();
    let store_a = UserId::new();
    let admin = UserId::new();

    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    let request = h
        .engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();
    h.engine
        .resolve_replacement_request(
            request.id,
            Decision::Approve,
            Some("confirmed"),
            admin,
            Role::Admin,
        )
        .await
        .unwrap();

    let actions: Vec<String> = h.audit.recorded().into_iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec!["warranty.activate", "replacement.request", "replacement.approve"]
    );

    // Admins were told about the request, the requester about the outcome.
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0].recipients,
        warrantydesk_core::providers::Recipients::Admins
    );
    assert_eq!(
        sent[1].recipients,
        warrantydesk_core::providers::Recipients::User(store_a)
    );
}

#[tokio::test]
async fn repair_lifecycle_and_one_open_slot() {
    let h = harness();
    let lab = UserId::new();
    let other_lab = UserId::new();

    let repair = h
        .engine
        .intake_repair(cracked_screen_intake(h.device_id), lab, Role::Lab)
        .await
        .unwrap();
    assert_eq!(repair.status, RepairStatus::Received);
    assert_eq!(repair.cost, Some(45000));

    // The open slot is taken, even for another lab.
    let err = h
        .engine
        .intake_repair(cracked_screen_intake(h.device_id), other_lab, Role::Lab)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::RepairAlreadyOpen);

    // received → in_progress → completed, with completed_at stamped.
    let repair = h
        .engine
        .update_repair_status(repair.id, RepairStatus::InProgress, lab, Role::Lab)
        .await
        .unwrap();
    let repair = h
        .engine
        .update_repair_status(repair.id, RepairStatus::Completed, lab, Role::Lab)
        .await
        .unwrap();
    assert!(repair.completed_at.is_some());

    // Completed is terminal.
    let err = h
        .engine
        .update_repair_status(repair.id, RepairStatus::InProgress, lab, Role::Lab)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::InvalidRepairTransition {
            from: RepairStatus::Completed,
            to: RepairStatus::InProgress,
        }
    );

    // The slot freed up once the repair completed.
    h.engine
        .intake_repair(cracked_screen_intake(h.device_id), other_lab, Role::Lab)
        .await
        .expect("slot free after completion");
}

#[tokio::test]
async fn foreign_lab_cannot_touch_a_repair() {
    let h = harness();
    let lab = UserId::new();
    let other_lab = UserId::new();

    let repair = h
        .engine
        .intake_repair(cracked_screen_intake(h.device_id), lab, Role::Lab)
        .await
        .unwrap();
    let err = h
        .engine
        .update_repair_status(repair.id, RepairStatus::InProgress, other_lab, Role::Lab)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::InsufficientRole);
}

#[tokio::test]
async fn read_projections_respect_roles() {
    let h = harness();
    let store_a = UserId::new();
    let store_b = UserId::new();
    let admin = UserId::new();

    h.engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    h.engine
        .create_replacement_request(h.device_id, "does not power on", store_a, Role::Store, None)
        .await
        .unwrap();

    // Store scoping.
    let own = h
        .engine
        .list_active_warranties(store_a, Role::Store)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    let foreign = h
        .engine
        .list_active_warranties(store_b, Role::Store)
        .await
        .unwrap();
    assert!(foreign.is_empty());
    let all = h
        .engine
        .list_active_warranties(admin, Role::Admin)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);

    // Pending queue is admin-only.
    let pending = h.engine.list_pending_requests(Role::Admin).await.unwrap();
    assert_eq!(pending.len(), 1);
    let err = h.engine.list_pending_requests(Role::Store).await.unwrap_err();
    assert_eq!(err, LifecycleError::InsufficientRole);

    // A request is visible to its requester and to admins only.
    let request_id = pending[0].id;
    h.engine
        .get_request(request_id, store_a, Role::Store)
        .await
        .expect("requester sees own request");
    let err = h
        .engine
        .get_request(request_id, store_b, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::NotAuthorizedForDevice);
}

#[tokio::test]
async fn catalog_intake_uses_the_lab_price_list() {
    use warrantydesk_core::domain::{RepairPrice, RepairTypeId};

    let h = harness();
    let lab = UserId::new();
    let screen_type = RepairTypeId::new();
    h.store.seed_repair_price(RepairPrice {
        lab_id: lab,
        repair_type_id: screen_type,
        price: 35000,
        is_active: true,
    });

    let mut intake = cracked_screen_intake(h.device_id);
    intake.job = RepairJob::Catalog(screen_type);
    let repair = h.engine.intake_repair(intake, lab, Role::Lab).await.unwrap();
    assert_eq!(repair.repair_type_id, Some(screen_type));
    assert_eq!(repair.cost, Some(35000));

    // A lab with no price for the type leaves cost unset.
    let other_lab = UserId::new();
    h.engine
        .update_repair_status(repair.id, RepairStatus::Cancelled, lab, Role::Lab)
        .await
        .unwrap();
    let mut intake = cracked_screen_intake(h.device_id);
    intake.job = RepairJob::Catalog(screen_type);
    let repair = h
        .engine
        .intake_repair(intake, other_lab, Role::Lab)
        .await
        .unwrap();
    assert_eq!(repair.cost, None);
}

#[tokio::test]
async fn fixed_clock_drives_expiry() {
    let h = harness();
    let store_a = UserId::new();

    // Move activation to a non-leap January 31st; expiry still lands
    // on January 31st a year later.
    h.clock
        .set(Utc.with_ymd_and_hms(2023, 1, 31, 8, 30, 0).unwrap());
    let receipt = h
        .engine
        .activate_warranty(h.device_id, "Yossi", "0501234567", store_a, Role::Store)
        .await
        .unwrap();
    assert_eq!(
        receipt.expiry_date,
        Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap()
    );
}
