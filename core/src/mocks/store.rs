//! In-memory lifecycle store.
//!
//! One mutex over the whole state: every conditional write is a
//! critical section, which gives the mock the same atomicity contract
//! the PostgreSQL store gets from transactions and partial unique
//! indexes.

use crate::domain::{
    Decision, Device, DeviceId, DeviceModel, ModelId, Repair, RepairId, RepairPrice, RepairStatus,
    RepairTypeId, ReplacementRequest, RequestId, RequestStatus, SearchLogEntry, UserId, Warranty,
    WarrantyId,
};
use crate::error::{LifecycleError, Result};
use crate::providers::LifecycleStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    models: HashMap<ModelId, DeviceModel>,
    devices: HashMap<DeviceId, Device>,
    warranties: HashMap<WarrantyId, Warranty>,
    repairs: HashMap<RepairId, Repair>,
    requests: HashMap<RequestId, ReplacementRequest>,
    prices: HashMap<(UserId, RepairTypeId), RepairPrice>,
    search_log: Vec<SearchLogEntry>,
}

/// In-memory lifecycle store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLifecycleStore {
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Arc<Mutex<Inner>>) -> Result<MutexGuard<'_, Inner>> {
    inner
        .lock()
        .map_err(|_| LifecycleError::Database("mutex poisoned".to_string()))
}

impl MemoryLifecycleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers. Device and model creation is import/manual-entry
    // territory, outside the lifecycle operations, so it lives on the
    // mock rather than on the trait.

    /// Seed a device model.
    pub fn seed_model(&self, model: DeviceModel) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.models.insert(model.id, model);
        }
    }

    /// Seed a device.
    pub fn seed_device(&self, device: Device) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.devices.insert(device.id, device);
        }
    }

    /// Seed a lab price for a repair type.
    pub fn seed_repair_price(&self, price: RepairPrice) {
        if let Ok(mut guard) = self.inner.lock() {
            guard
                .prices
                .insert((price.lab_id, price.repair_type_id), price);
        }
    }

    /// Number of search log rows, for quota assertions.
    #[must_use]
    pub fn search_log_len(&self) -> usize {
        self.inner.lock().map(|g| g.search_log.len()).unwrap_or(0)
    }
}

impl LifecycleStore for MemoryLifecycleStore {
    fn find_device(&self, id: DeviceId) -> impl Future<Output = Result<Option<Device>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Ok(lock(&inner)?.devices.get(&id).cloned()) }
    }

    fn find_device_by_imei(
        &self,
        imei: &str,
    ) -> impl Future<Output = Result<Option<Device>>> + Send {
        let inner = Arc::clone(&self.inner);
        let imei = imei.to_string();

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .devices
                .values()
                .find(|d| d.imei == imei || d.imei2.as_deref() == Some(imei.as_str()))
                .cloned())
        }
    }

    fn find_model(&self, id: ModelId) -> impl Future<Output = Result<Option<DeviceModel>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Ok(lock(&inner)?.models.get(&id).cloned()) }
    }

    fn active_warranty_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Warranty>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .warranties
                .values()
                .find(|w| w.device_id == device_id && w.is_active)
                .cloned())
        }
    }

    fn find_warranty(&self, id: WarrantyId) -> impl Future<Output = Result<Option<Warranty>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Ok(lock(&inner)?.warranties.get(&id).cloned()) }
    }

    fn insert_warranty(&self, warranty: Warranty) -> impl Future<Output = Result<Warranty>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let mut guard = lock(&inner)?;

            // Re-verify the whole predicate under the lock.
            let device = guard
                .devices
                .get(&warranty.device_id)
                .ok_or(LifecycleError::DeviceNotFound)?;
            if device.is_replaced {
                return Err(LifecycleError::DeviceReplaced);
            }
            if let Some(existing) = guard
                .warranties
                .values()
                .find(|w| w.device_id == warranty.device_id && w.is_active)
            {
                return Err(LifecycleError::WarrantyAlreadyActive {
                    store_id: Some(existing.store_id),
                });
            }

            guard.warranties.insert(warranty.id, warranty.clone());
            Ok(warranty)
        }
    }

    fn list_active_warranties_for_store(
        &self,
        store_id: UserId,
    ) -> impl Future<Output = Result<Vec<Warranty>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .warranties
                .values()
                .filter(|w| w.is_active && w.store_id == store_id)
                .cloned()
                .collect())
        }
    }

    fn list_active_warranties(&self) -> impl Future<Output = Result<Vec<Warranty>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .warranties
                .values()
                .filter(|w| w.is_active)
                .cloned()
                .collect())
        }
    }

    fn pending_request_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<ReplacementRequest>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .requests
                .values()
                .find(|r| r.device_id == device_id && r.status == RequestStatus::Pending)
                .cloned())
        }
    }

    fn find_request(
        &self,
        id: RequestId,
    ) -> impl Future<Output = Result<Option<ReplacementRequest>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Ok(lock(&inner)?.requests.get(&id).cloned()) }
    }

    fn insert_request(
        &self,
        request: ReplacementRequest,
    ) -> impl Future<Output = Result<ReplacementRequest>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let mut guard = lock(&inner)?;

            let device = guard
                .devices
                .get(&request.device_id)
                .ok_or(LifecycleError::DeviceNotFound)?;
            if device.is_replaced {
                return Err(LifecycleError::DeviceReplaced);
            }
            if guard
                .requests
                .values()
                .any(|r| r.device_id == request.device_id && r.status == RequestStatus::Pending)
            {
                return Err(LifecycleError::RequestAlreadyPending);
            }

            // The linked repair diverts in the same critical section.
            if let Some(repair_id) = request.repair_id {
                if let Some(repair) = guard.repairs.get_mut(&repair_id) {
                    if repair.status.is_open() {
                        repair.status = RepairStatus::ReplacementRequested;
                    }
                }
            }

            guard.requests.insert(request.id, request.clone());
            Ok(request)
        }
    }

    fn resolve_request(
        &self,
        id: RequestId,
        decision: Decision,
        admin_notes: Option<String>,
        resolver: UserId,
        resolved_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<ReplacementRequest>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let mut guard = lock(&inner)?;

            let request = guard
                .requests
                .get_mut(&id)
                .ok_or(LifecycleError::RequestNotPending)?;
            if request.status != RequestStatus::Pending {
                return Err(LifecycleError::RequestNotPending);
            }

            request.status = match decision {
                Decision::Approve => RequestStatus::Approved,
                Decision::Reject => RequestStatus::Rejected,
            };
            request.admin_notes = admin_notes;
            request.resolved_by = Some(resolver);
            request.resolved_at = Some(resolved_at);
            let resolved = request.clone();

            // Approve cascades inside the same critical section:
            // request, device, and warranty change together or not at all.
            if decision == Decision::Approve {
                if let Some(device) = guard.devices.get_mut(&resolved.device_id) {
                    device.is_replaced = true;
                    device.replaced_at = Some(resolved_at);
                }
                if let Some(warranty_id) = resolved.warranty_id {
                    if let Some(warranty) = guard.warranties.get_mut(&warranty_id) {
                        warranty.is_active = false;
                    }
                }
            }

            Ok(resolved)
        }
    }

    fn list_pending_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<ReplacementRequest>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            let mut pending: Vec<_> = guard
                .requests
                .values()
                .filter(|r| r.status == RequestStatus::Pending)
                .cloned()
                .collect();
            pending.sort_by_key(|r| r.created_at);
            Ok(pending)
        }
    }

    fn open_repair_for_device(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Repair>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .repairs
                .values()
                .find(|r| r.device_id == device_id && r.status.is_open())
                .cloned())
        }
    }

    fn find_repair(&self, id: RepairId) -> impl Future<Output = Result<Option<Repair>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Ok(lock(&inner)?.repairs.get(&id).cloned()) }
    }

    fn insert_repair(&self, repair: Repair) -> impl Future<Output = Result<Repair>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let mut guard = lock(&inner)?;

            let device = guard
                .devices
                .get(&repair.device_id)
                .ok_or(LifecycleError::DeviceNotFound)?;
            if device.is_replaced {
                return Err(LifecycleError::DeviceReplaced);
            }
            if guard
                .repairs
                .values()
                .any(|r| r.device_id == repair.device_id && r.status.is_open())
            {
                return Err(LifecycleError::RepairAlreadyOpen);
            }

            guard.repairs.insert(repair.id, repair.clone());
            Ok(repair)
        }
    }

    fn update_repair_status(
        &self,
        id: RepairId,
        from: RepairStatus,
        to: RepairStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Repair>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let mut guard = lock(&inner)?;
            let repair = guard
                .repairs
                .get_mut(&id)
                .ok_or_else(|| LifecycleError::Database(format!("repair {id} not found")))?;

            // Compare-and-swap: a concurrent transition loses here.
            if repair.status != from {
                return Err(LifecycleError::InvalidRepairTransition {
                    from: repair.status,
                    to,
                });
            }

            repair.status = to;
            if completed_at.is_some() {
                repair.completed_at = completed_at;
            }
            Ok(repair.clone())
        }
    }

    fn list_repairs_for_lab(
        &self,
        lab_id: UserId,
    ) -> impl Future<Output = Result<Vec<Repair>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            let mut repairs: Vec<_> = guard
                .repairs
                .values()
                .filter(|r| r.lab_id == lab_id)
                .cloned()
                .collect();
            repairs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(repairs)
        }
    }

    fn repair_price(
        &self,
        lab_id: UserId,
        repair_type_id: RepairTypeId,
    ) -> impl Future<Output = Result<Option<RepairPrice>>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .prices
                .get(&(lab_id, repair_type_id))
                .filter(|p| p.is_active)
                .cloned())
        }
    }

    fn count_searches_since(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            let guard = lock(&inner)?;
            Ok(guard
                .search_log
                .iter()
                .filter(|e| e.user_id == user_id && e.created_at >= cutoff)
                .count() as u64)
        }
    }

    fn append_search_log(
        &self,
        entry: SearchLogEntry,
    ) -> impl Future<Output = Result<()>> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            lock(&inner)?.search_log.push(entry);
            Ok(())
        }
    }
}
