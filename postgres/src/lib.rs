//! PostgreSQL store for the WarrantyDesk lifecycle engine.
//!
//! Implements [`LifecycleStore`] over a `PgPool`. The per-device slot
//! invariants are enforced twice: the conditional writes re-verify
//! their predicates inside a transaction that locks the device row, and
//! the partial unique indexes in the migration are the backstop against
//! anything that slips through.
//!
//! # Example
//!
//! ```no_run
//! use warrantydesk_postgres::PgLifecycleStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/warrantydesk").await?;
//! let store = PgLifecycleStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use warrantydesk_core::domain::{
    Decision, Device, DeviceId, DeviceModel, FaultType, ModelId, Repair, RepairId, RepairPrice,
    RepairStatus, RepairTypeId, ReplacementRequest, RequestId, RequestStatus, SearchLogEntry,
    UserId, Warranty, WarrantyId,
};
use warrantydesk_core::error::{LifecycleError, Result};
use warrantydesk_core::providers::LifecycleStore;

/// PostgreSQL lifecycle store.
#[derive(Clone)]
pub struct PgLifecycleStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

fn db_err(e: sqlx::Error) -> LifecycleError {
    LifecycleError::Database(e.to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════════════════════════════════

fn parse_repair_status(s: &str) -> Result<RepairStatus> {
    match s {
        "received" => Ok(RepairStatus::Received),
        "in_progress" => Ok(RepairStatus::InProgress),
        "completed" => Ok(RepairStatus::Completed),
        "replacement_requested" => Ok(RepairStatus::ReplacementRequested),
        "cancelled" => Ok(RepairStatus::Cancelled),
        other => Err(LifecycleError::Database(format!(
            "unknown repair status {other:?}"
        ))),
    }
}

fn parse_request_status(s: &str) -> Result<RequestStatus> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(LifecycleError::Database(format!(
            "unknown request status {other:?}"
        ))),
    }
}

fn parse_fault_type(s: &str) -> Result<FaultType> {
    match s {
        "screen" => Ok(FaultType::Screen),
        "charging_port" => Ok(FaultType::ChargingPort),
        "flash" => Ok(FaultType::Flash),
        "speaker" => Ok(FaultType::Speaker),
        "board" => Ok(FaultType::Board),
        "other" => Ok(FaultType::Other),
        other => Err(LifecycleError::Database(format!(
            "unknown fault type {other:?}"
        ))),
    }
}

const fn fault_type_str(f: FaultType) -> &'static str {
    match f {
        FaultType::Screen => "screen",
        FaultType::ChargingPort => "charging_port",
        FaultType::Flash => "flash",
        FaultType::Speaker => "speaker",
        FaultType::Board => "board",
        FaultType::Other => "other",
    }
}

fn months_from_i32(v: i32) -> Result<u32> {
    u32::try_from(v).map_err(|_| LifecycleError::Database(format!("negative warranty_months {v}")))
}

fn device_from_row(row: &PgRow) -> Result<Device> {
    Ok(Device {
        id: DeviceId(row.try_get("id").map_err(db_err)?),
        imei: row.try_get("imei").map_err(db_err)?,
        imei2: row.try_get("imei2").map_err(db_err)?,
        model_id: ModelId(row.try_get("model_id").map_err(db_err)?),
        warranty_months: months_from_i32(row.try_get("warranty_months").map_err(db_err)?)?,
        is_replaced: row.try_get("is_replaced").map_err(db_err)?,
        replaced_at: row.try_get("replaced_at").map_err(db_err)?,
        import_batch: row.try_get("import_batch").map_err(db_err)?,
        imported_by: row
            .try_get::<Option<uuid::Uuid>, _>("imported_by")
            .map_err(db_err)?
            .map(UserId),
        notes: row.try_get("notes").map_err(db_err)?,
    })
}

fn model_from_row(row: &PgRow) -> Result<DeviceModel> {
    Ok(DeviceModel {
        id: ModelId(row.try_get("id").map_err(db_err)?),
        model_name: row.try_get("model_name").map_err(db_err)?,
        manufacturer: row.try_get("manufacturer").map_err(db_err)?,
        warranty_months: months_from_i32(row.try_get("warranty_months").map_err(db_err)?)?,
        is_active: row.try_get("is_active").map_err(db_err)?,
    })
}

fn warranty_from_row(row: &PgRow) -> Result<Warranty> {
    Ok(Warranty {
        id: WarrantyId(row.try_get("id").map_err(db_err)?),
        device_id: DeviceId(row.try_get("device_id").map_err(db_err)?),
        store_id: UserId(row.try_get("store_id").map_err(db_err)?),
        activated_by: row
            .try_get::<Option<uuid::Uuid>, _>("activated_by")
            .map_err(db_err)?
            .map(UserId),
        customer_name: row.try_get("customer_name").map_err(db_err)?,
        customer_phone: row.try_get("customer_phone").map_err(db_err)?,
        activation_date: row.try_get("activation_date").map_err(db_err)?,
        expiry_date: row.try_get("expiry_date").map_err(db_err)?,
        is_active: row.try_get("is_active").map_err(db_err)?,
        notes: row.try_get("notes").map_err(db_err)?,
    })
}

fn repair_from_row(row: &PgRow) -> Result<Repair> {
    Ok(Repair {
        id: RepairId(row.try_get("id").map_err(db_err)?),
        device_id: DeviceId(row.try_get("device_id").map_err(db_err)?),
        lab_id: UserId(row.try_get("lab_id").map_err(db_err)?),
        warranty_id: row
            .try_get::<Option<uuid::Uuid>, _>("warranty_id")
            .map_err(db_err)?
            .map(WarrantyId),
        status: parse_repair_status(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        customer_name: row.try_get("customer_name").map_err(db_err)?,
        customer_phone: row.try_get("customer_phone").map_err(db_err)?,
        fault_type: row
            .try_get::<Option<String>, _>("fault_type")
            .map_err(db_err)?
            .as_deref()
            .map(parse_fault_type)
            .transpose()?,
        fault_description: row.try_get("fault_description").map_err(db_err)?,
        repair_type_id: row
            .try_get::<Option<uuid::Uuid>, _>("repair_type_id")
            .map_err(db_err)?
            .map(RepairTypeId),
        custom_repair_description: row.try_get("custom_repair_description").map_err(db_err)?,
        cost: row.try_get("cost").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        completed_at: row.try_get("completed_at").map_err(db_err)?,
    })
}

fn request_from_row(row: &PgRow) -> Result<ReplacementRequest> {
    Ok(ReplacementRequest {
        id: RequestId(row.try_get("id").map_err(db_err)?),
        device_id: DeviceId(row.try_get("device_id").map_err(db_err)?),
        warranty_id: row
            .try_get::<Option<uuid::Uuid>, _>("warranty_id")
            .map_err(db_err)?
            .map(WarrantyId),
        repair_id: row
            .try_get::<Option<uuid::Uuid>, _>("repair_id")
            .map_err(db_err)?
            .map(RepairId),
        requester_id: UserId(row.try_get("requester_id").map_err(db_err)?),
        reason: row.try_get("reason").map_err(db_err)?,
        customer_name: row.try_get("customer_name").map_err(db_err)?,
        customer_phone: row.try_get("customer_phone").map_err(db_err)?,
        status: parse_request_status(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        admin_notes: row.try_get("admin_notes").map_err(db_err)?,
        resolved_by: row
            .try_get::<Option<uuid::Uuid>, _>("resolved_by")
            .map_err(db_err)?
            .map(UserId),
        resolved_at: row.try_get("resolved_at").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════════════════

impl PgLifecycleStore {
    /// Create a store over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LifecycleError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Lock the device row for the duration of a conditional write and
    /// verify it is still eligible for the lifecycle.
    async fn lock_device(
        tx: &mut Transaction<'_, Postgres>,
        device_id: DeviceId,
    ) -> Result<()> {
        let row = sqlx::query("SELECT is_replaced FROM devices WHERE id = $1 FOR UPDATE")
            .bind(device_id.0)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)?
            .ok_or(LifecycleError::DeviceNotFound)?;
        if row.try_get::<bool, _>("is_replaced").map_err(db_err)? {
            return Err(LifecycleError::DeviceReplaced);
        }
        Ok(())
    }
}

impl LifecycleStore for PgLifecycleStore {
    async fn find_device(&self, id: DeviceId) -> Result<Option<Device>> {
        sqlx::query("SELECT * FROM devices WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(device_from_row)
            .transpose()
    }

    async fn find_device_by_imei(&self, imei: &str) -> Result<Option<Device>> {
        sqlx::query("SELECT * FROM devices WHERE imei = $1 OR imei2 = $1")
            .bind(imei)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(device_from_row)
            .transpose()
    }

    async fn find_model(&self, id: ModelId) -> Result<Option<DeviceModel>> {
        sqlx::query("SELECT * FROM device_models WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(model_from_row)
            .transpose()
    }

    async fn active_warranty_for_device(&self, device_id: DeviceId) -> Result<Option<Warranty>> {
        sqlx::query("SELECT * FROM warranties WHERE device_id = $1 AND is_active")
            .bind(device_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(warranty_from_row)
            .transpose()
    }

    async fn find_warranty(&self, id: WarrantyId) -> Result<Option<Warranty>> {
        sqlx::query("SELECT * FROM warranties WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(warranty_from_row)
            .transpose()
    }

    async fn insert_warranty(&self, warranty: Warranty) -> Result<Warranty> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // The device-row lock serializes concurrent writers for the
        // same device; the partial unique index is the backstop.
        Self::lock_device(&mut tx, warranty.device_id).await?;

        let existing =
            sqlx::query("SELECT store_id FROM warranties WHERE device_id = $1 AND is_active")
                .bind(warranty.device_id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        if let Some(row) = existing {
            return Err(LifecycleError::WarrantyAlreadyActive {
                store_id: Some(UserId(row.try_get("store_id").map_err(db_err)?)),
            });
        }

        sqlx::query(
            r"
            INSERT INTO warranties
                (id, device_id, store_id, activated_by, customer_name, customer_phone,
                 activation_date, expiry_date, is_active, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(warranty.id.0)
        .bind(warranty.device_id.0)
        .bind(warranty.store_id.0)
        .bind(warranty.activated_by.map(|u| u.0))
        .bind(&warranty.customer_name)
        .bind(&warranty.customer_phone)
        .bind(warranty.activation_date)
        .bind(warranty.expiry_date)
        .bind(warranty.is_active)
        .bind(&warranty.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return LifecycleError::WarrantyAlreadyActive { store_id: None };
                }
            }
            db_err(e)
        })?;

        tx.commit().await.map_err(db_err)?;
        Ok(warranty)
    }

    async fn list_active_warranties_for_store(&self, store_id: UserId) -> Result<Vec<Warranty>> {
        sqlx::query(
            "SELECT * FROM warranties WHERE store_id = $1 AND is_active ORDER BY activation_date DESC",
        )
        .bind(store_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(warranty_from_row)
        .collect()
    }

    async fn list_active_warranties(&self) -> Result<Vec<Warranty>> {
        sqlx::query("SELECT * FROM warranties WHERE is_active ORDER BY activation_date DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(warranty_from_row)
            .collect()
    }

    async fn pending_request_for_device(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<ReplacementRequest>> {
        sqlx::query("SELECT * FROM replacement_requests WHERE device_id = $1 AND status = 'pending'")
            .bind(device_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(request_from_row)
            .transpose()
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<ReplacementRequest>> {
        sqlx::query("SELECT * FROM replacement_requests WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(request_from_row)
            .transpose()
    }

    async fn insert_request(&self, request: ReplacementRequest) -> Result<ReplacementRequest> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        Self::lock_device(&mut tx, request.device_id).await?;

        let pending = sqlx::query(
            "SELECT 1 AS one FROM replacement_requests WHERE device_id = $1 AND status = 'pending'",
        )
        .bind(request.device_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        if pending.is_some() {
            return Err(LifecycleError::RequestAlreadyPending);
        }

        sqlx::query(
            r"
            INSERT INTO replacement_requests
                (id, device_id, warranty_id, repair_id, requester_id, reason,
                 customer_name, customer_phone, status, admin_notes, resolved_by,
                 resolved_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, NULL, NULL, $10)
            ",
        )
        .bind(request.id.0)
        .bind(request.device_id.0)
        .bind(request.warranty_id.map(|w| w.0))
        .bind(request.repair_id.map(|r| r.0))
        .bind(request.requester_id.0)
        .bind(&request.reason)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return LifecycleError::RequestAlreadyPending;
                }
            }
            db_err(e)
        })?;

        // The linked repair diverts in the same transaction.
        if let Some(repair_id) = request.repair_id {
            sqlx::query(
                r"
                UPDATE repairs SET status = 'replacement_requested'
                WHERE id = $1 AND status IN ('received', 'in_progress')
                ",
            )
            .bind(repair_id.0)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(request)
    }

    async fn resolve_request(
        &self,
        id: RequestId,
        decision: Decision,
        admin_notes: Option<String>,
        resolver: UserId,
        resolved_at: DateTime<Utc>,
    ) -> Result<ReplacementRequest> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let status = match decision {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        };

        // Compare-and-swap on pending: a second resolver updates zero
        // rows and fails here.
        let row = sqlx::query(
            r"
            UPDATE replacement_requests
            SET status = $2, admin_notes = $3, resolved_by = $4, resolved_at = $5
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            ",
        )
        .bind(id.0)
        .bind(status.as_str())
        .bind(&admin_notes)
        .bind(resolver.0)
        .bind(resolved_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(LifecycleError::RequestNotPending)?;
        let request = request_from_row(&row)?;

        // Approve cascades in the same transaction: all three writes
        // commit together or none do.
        if decision == Decision::Approve {
            sqlx::query("UPDATE devices SET is_replaced = TRUE, replaced_at = $2 WHERE id = $1")
                .bind(request.device_id.0)
                .bind(resolved_at)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            if let Some(warranty_id) = request.warranty_id {
                sqlx::query("UPDATE warranties SET is_active = FALSE WHERE id = $1")
                    .bind(warranty_id.0)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
            }
        }

        tx.commit().await.map_err(db_err)?;
        Ok(request)
    }

    async fn list_pending_requests(&self) -> Result<Vec<ReplacementRequest>> {
        sqlx::query(
            "SELECT * FROM replacement_requests WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(request_from_row)
        .collect()
    }

    async fn open_repair_for_device(&self, device_id: DeviceId) -> Result<Option<Repair>> {
        sqlx::query(
            "SELECT * FROM repairs WHERE device_id = $1 AND status IN ('received', 'in_progress')",
        )
        .bind(device_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(repair_from_row)
        .transpose()
    }

    async fn find_repair(&self, id: RepairId) -> Result<Option<Repair>> {
        sqlx::query("SELECT * FROM repairs WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(repair_from_row)
            .transpose()
    }

    async fn insert_repair(&self, repair: Repair) -> Result<Repair> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        Self::lock_device(&mut tx, repair.device_id).await?;

        let open = sqlx::query(
            "SELECT 1 AS one FROM repairs WHERE device_id = $1 AND status IN ('received', 'in_progress')",
        )
        .bind(repair.device_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        if open.is_some() {
            return Err(LifecycleError::RepairAlreadyOpen);
        }

        sqlx::query(
            r"
            INSERT INTO repairs
                (id, device_id, lab_id, warranty_id, status, customer_name,
                 customer_phone, fault_type, fault_description, repair_type_id,
                 custom_repair_description, cost, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NULL)
            ",
        )
        .bind(repair.id.0)
        .bind(repair.device_id.0)
        .bind(repair.lab_id.0)
        .bind(repair.warranty_id.map(|w| w.0))
        .bind(repair.status.as_str())
        .bind(&repair.customer_name)
        .bind(&repair.customer_phone)
        .bind(repair.fault_type.map(fault_type_str))
        .bind(&repair.fault_description)
        .bind(repair.repair_type_id.map(|t| t.0))
        .bind(&repair.custom_repair_description)
        .bind(repair.cost)
        .bind(repair.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return LifecycleError::RepairAlreadyOpen;
                }
            }
            db_err(e)
        })?;

        tx.commit().await.map_err(db_err)?;
        Ok(repair)
    }

    async fn update_repair_status(
        &self,
        id: RepairId,
        from: RepairStatus,
        to: RepairStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Repair> {
        let row = sqlx::query(
            r"
            UPDATE repairs
            SET status = $3, completed_at = COALESCE($4, completed_at)
            WHERE id = $1 AND status = $2
            RETURNING *
            ",
        )
        .bind(id.0)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = row {
            return repair_from_row(&row);
        }

        // Zero rows: either the repair is gone or a concurrent
        // transition beat us. Report the actual current status.
        let current = self
            .find_repair(id)
            .await?
            .ok_or_else(|| LifecycleError::Database(format!("repair {id} not found")))?;
        Err(LifecycleError::InvalidRepairTransition {
            from: current.status,
            to,
        })
    }

    async fn list_repairs_for_lab(&self, lab_id: UserId) -> Result<Vec<Repair>> {
        sqlx::query("SELECT * FROM repairs WHERE lab_id = $1 ORDER BY created_at DESC")
            .bind(lab_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(repair_from_row)
            .collect()
    }

    async fn repair_price(
        &self,
        lab_id: UserId,
        repair_type_id: RepairTypeId,
    ) -> Result<Option<RepairPrice>> {
        let row = sqlx::query(
            "SELECT * FROM lab_repair_prices WHERE lab_id = $1 AND repair_type_id = $2 AND is_active",
        )
        .bind(lab_id.0)
        .bind(repair_type_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|row| {
            Ok(RepairPrice {
                lab_id: UserId(row.try_get("lab_id").map_err(db_err)?),
                repair_type_id: RepairTypeId(row.try_get("repair_type_id").map_err(db_err)?),
                price: row.try_get("price").map_err(db_err)?,
                is_active: row.try_get("is_active").map_err(db_err)?,
            })
        })
        .transpose()
    }

    async fn count_searches_since(&self, user_id: UserId, cutoff: DateTime<Utc>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM device_search_log WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id.0)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        u64::try_from(count)
            .map_err(|_| LifecycleError::Database(format!("negative search count {count}")))
    }

    async fn append_search_log(&self, entry: SearchLogEntry) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO device_search_log
                (user_id, search_term, device_found, device_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(entry.user_id.0)
        .bind(&entry.search_term)
        .bind(entry.device_found)
        .bind(entry.device_id.map(|d| d.0))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            RepairStatus::Received,
            RepairStatus::InProgress,
            RepairStatus::Completed,
            RepairStatus::ReplacementRequested,
            RepairStatus::Cancelled,
        ] {
            assert_eq!(parse_repair_status(status.as_str()).unwrap(), status);
        }
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(parse_request_status(status.as_str()).unwrap(), status);
        }
        assert!(parse_repair_status("melted").is_err());
    }

    #[test]
    fn fault_type_strings_round_trip() {
        for fault in [
            FaultType::Screen,
            FaultType::ChargingPort,
            FaultType::Flash,
            FaultType::Speaker,
            FaultType::Board,
            FaultType::Other,
        ] {
            assert_eq!(parse_fault_type(fault_type_str(fault)).unwrap(), fault);
        }
    }
}
