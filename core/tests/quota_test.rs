//! Rolling search-quota tests.
//!
//! The quota is a rolling 24-hour window over the search log: hitting
//! the cap refuses the lookup without logging it, and capacity frees up
//! as old entries age past the window.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use chrono::{Duration, TimeZone, Utc};
use warrantydesk_core::LifecycleError;
use warrantydesk_core::config::LifecycleConfig;
use warrantydesk_core::domain::{Device, DeviceId, ModelId, Role, UserId};
use warrantydesk_core::engine::LifecycleEngine;
use warrantydesk_core::mocks::{FixedClock, MemoryLifecycleStore, MockAuditSink, MockNotifier};

type TestEngine = LifecycleEngine<MemoryLifecycleStore, MockAuditSink, MockNotifier, FixedClock>;

const IMEI: &str = "356880041234567";

fn quota_harness(quota: u32) -> (TestEngine, MemoryLifecycleStore, FixedClock) {
    let store = MemoryLifecycleStore::new();
    store.seed_device(Device {
        id: DeviceId::new(),
        imei: IMEI.to_string(),
        imei2: None,
        model_id: ModelId::new(),
        warranty_months: 12,
        is_replaced: false,
        replaced_at: None,
        import_batch: None,
        imported_by: None,
        notes: None,
    });

    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    let engine = LifecycleEngine::new(
        store.clone(),
        MockAuditSink::new(),
        MockNotifier::new(),
        clock.clone(),
        LifecycleConfig::default().with_search_quota(quota),
    );
    (engine, store, clock)
}

#[tokio::test]
async fn cap_blocks_the_next_search_without_logging_it() {
    let (engine, store, _clock) = quota_harness(50);
    let user = UserId::new();

    for _ in 0..50 {
        engine
            .search_device_by_imei(IMEI, user, Role::Store)
            .await
            .expect("within quota");
    }
    assert_eq!(store.search_log_len(), 50);

    let err = engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::QuotaExceeded { limit: 50 });

    // The refused attempt did not become a 51st ledger row.
    assert_eq!(store.search_log_len(), 50);
}

#[tokio::test]
async fn misses_consume_quota_too() {
    let (engine, store, _clock) = quota_harness(3);
    let user = UserId::new();

    for _ in 0..3 {
        let err = engine
            .search_device_by_imei("999999999999999", user, Role::Store)
            .await
            .unwrap_err();
        assert_eq!(err, LifecycleError::DeviceNotFound);
    }
    // Misses are logged with device_found = false and count against the cap.
    assert_eq!(store.search_log_len(), 3);

    let err = engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::QuotaExceeded { limit: 3 });
}

#[tokio::test]
async fn window_is_rolling_not_calendar() {
    let (engine, store, clock) = quota_harness(5);
    let user = UserId::new();

    // Two searches in the morning, three in the afternoon.
    for _ in 0..2 {
        engine
            .search_device_by_imei(IMEI, user, Role::Store)
            .await
            .unwrap();
    }
    clock.advance(Duration::hours(6));
    for _ in 0..3 {
        engine
            .search_device_by_imei(IMEI, user, Role::Store)
            .await
            .unwrap();
    }
    let err = engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::QuotaExceeded { limit: 5 });

    // 19 hours later the two morning entries have aged out; exactly
    // their capacity is back.
    clock.advance(Duration::hours(19));
    engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .expect("morning capacity freed");
    engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .expect("second freed slot");
    let err = engine
        .search_device_by_imei(IMEI, user, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::QuotaExceeded { limit: 5 });

    assert_eq!(store.search_log_len(), 7);
}

#[tokio::test]
async fn quota_is_per_user() {
    let (engine, _store, _clock) = quota_harness(1);
    let user_a = UserId::new();
    let user_b = UserId::new();

    engine
        .search_device_by_imei(IMEI, user_a, Role::Store)
        .await
        .unwrap();
    let err = engine
        .search_device_by_imei(IMEI, user_a, Role::Store)
        .await
        .unwrap_err();
    assert_eq!(err, LifecycleError::QuotaExceeded { limit: 1 });

    // Another user's ledger is untouched.
    engine
        .search_device_by_imei(IMEI, user_b, Role::Lab)
        .await
        .expect("other user has their own quota");
}

#[tokio::test]
async fn admins_are_exempt() {
    let (engine, store, _clock) = quota_harness(2);
    let admin = UserId::new();

    for _ in 0..10 {
        engine
            .search_device_by_imei(IMEI, admin, Role::Admin)
            .await
            .expect("admins bypass the quota");
    }
    // Admin searches are still logged.
    assert_eq!(store.search_log_len(), 10);
}
