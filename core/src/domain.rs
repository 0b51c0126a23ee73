//! Domain types for the warranty lifecycle.
//!
//! All types are `Clone` + `Serialize` so they can cross the store
//! boundary and be embedded in audit/notification payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random id.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user (admin, store, or lab).
    UserId
);
uuid_id!(
    /// Unique identifier for a device.
    DeviceId
);
uuid_id!(
    /// Unique identifier for a device model.
    ModelId
);
uuid_id!(
    /// Unique identifier for a warranty.
    WarrantyId
);
uuid_id!(
    /// Unique identifier for a repair.
    RepairId
);
uuid_id!(
    /// Unique identifier for a replacement request.
    RequestId
);
uuid_id!(
    /// Unique identifier for a repair type.
    RepairTypeId
);

// ═══════════════════════════════════════════════════════════════════════
// Roles and status enums
// ═══════════════════════════════════════════════════════════════════════

/// Role of the user making a lifecycle request.
///
/// Supplied by the identity provider; the engine trusts it and performs
/// no authentication of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office administrator. Sees everything, resolves requests.
    Admin,
    /// Retail store. Activates warranties, sees only its own customers.
    Store,
    /// Repair lab. Intakes repairs, may request replacements.
    Lab,
}

impl Role {
    /// String form matching the `user_role` enum in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Store => "store",
            Self::Lab => "lab",
        }
    }
}

/// Status of a repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// Device received at the lab.
    Received,
    /// Repair work underway.
    InProgress,
    /// Repair finished and handed back.
    Completed,
    /// Repair abandoned in favor of a replacement request.
    ReplacementRequested,
    /// Repair cancelled before completion.
    Cancelled,
}

impl RepairStatus {
    /// String form matching the `repair_status` enum in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::ReplacementRequested => "replacement_requested",
            Self::Cancelled => "cancelled",
        }
    }

    /// An open repair occupies the device's single repair slot.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Received | Self::InProgress)
    }
}

/// Status of a replacement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting admin adjudication.
    Pending,
    /// Approved; device replaced, warranty deactivated.
    Approved,
    /// Rejected with admin notes.
    Rejected,
}

impl RequestStatus {
    /// String form matching the `request_status` enum in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Admin decision on a pending replacement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Replace the device: cascades to device and warranty.
    Approve,
    /// Keep the device as-is; notes required.
    Reject,
}

/// Reported fault category for a repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    /// Display damage.
    Screen,
    /// Charging port failure.
    ChargingPort,
    /// Camera flash failure.
    Flash,
    /// Speaker or audio failure.
    Speaker,
    /// Mainboard fault.
    Board,
    /// Anything else; see `fault_description`.
    Other,
}

// ═══════════════════════════════════════════════════════════════════════
// Entities
// ═══════════════════════════════════════════════════════════════════════

/// A device model with its warranty term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Model identifier.
    pub id: ModelId,
    /// Human-readable model name.
    pub model_name: String,
    /// Manufacturer, if known.
    pub manufacturer: Option<String>,
    /// Warranty term in calendar months.
    pub warranty_months: u32,
    /// Whether the model is still offered.
    pub is_active: bool,
}

/// A tracked device. Identity is by IMEI or IMEI2 (dual-SIM).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Device identifier.
    pub id: DeviceId,
    /// Primary IMEI.
    pub imei: String,
    /// Secondary IMEI for dual-SIM devices.
    pub imei2: Option<String>,
    /// Model this device belongs to.
    pub model_id: ModelId,
    /// Warranty term in months, denormalized from the model at import time.
    pub warranty_months: u32,
    /// Terminal flag: a replaced device never re-enters the lifecycle.
    pub is_replaced: bool,
    /// When the device was marked replaced.
    pub replaced_at: Option<DateTime<Utc>>,
    /// Import batch label, if the device came in via bulk import.
    pub import_batch: Option<String>,
    /// Who imported or entered the device.
    pub imported_by: Option<UserId>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A warranty binding a device to a customer and the activating store.
///
/// Deactivated (never deleted) when a replacement is approved. The
/// `store_id` is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
    /// Warranty identifier.
    pub id: WarrantyId,
    /// Covered device.
    pub device_id: DeviceId,
    /// Store that activated the warranty.
    pub store_id: UserId,
    /// Individual user who performed the activation.
    pub activated_by: Option<UserId>,
    /// Customer name. Visible only per the access policy.
    pub customer_name: String,
    /// Customer phone. Visible only per the access policy.
    pub customer_phone: String,
    /// When coverage started.
    pub activation_date: DateTime<Utc>,
    /// When coverage ends (calendar-month arithmetic from activation).
    pub expiry_date: DateTime<Utc>,
    /// At most one active warranty exists per device.
    pub is_active: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A repair job at a lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    /// Repair identifier.
    pub id: RepairId,
    /// Device under repair.
    pub device_id: DeviceId,
    /// Lab servicing the repair.
    pub lab_id: UserId,
    /// Active warranty at intake time, if any.
    pub warranty_id: Option<WarrantyId>,
    /// Current status.
    pub status: RepairStatus,
    /// Customer name taken at intake.
    pub customer_name: String,
    /// Customer phone taken at intake.
    pub customer_phone: String,
    /// Fault category.
    pub fault_type: Option<FaultType>,
    /// Free-form fault description.
    pub fault_description: Option<String>,
    /// Catalog repair type, if not a custom job.
    pub repair_type_id: Option<RepairTypeId>,
    /// Description for custom jobs.
    pub custom_repair_description: Option<String>,
    /// Cost in agorot/cents. Set from the lab's price list, or the
    /// custom price for custom jobs.
    pub cost: Option<i64>,
    /// When the repair was created.
    pub created_at: DateTime<Utc>,
    /// When the repair reached `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A claim that a device should be swapped under warranty or repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementRequest {
    /// Request identifier.
    pub id: RequestId,
    /// Device the claim is about.
    pub device_id: DeviceId,
    /// Active warranty at request time, if any.
    pub warranty_id: Option<WarrantyId>,
    /// Open repair the claim came out of, if any.
    pub repair_id: Option<RepairId>,
    /// Store or lab that raised the request.
    pub requester_id: UserId,
    /// Why the device should be replaced.
    pub reason: String,
    /// Customer name snapshot from the warranty or repair.
    pub customer_name: String,
    /// Customer phone snapshot from the warranty or repair.
    pub customer_phone: String,
    /// Current status. At most one `Pending` request exists per device.
    pub status: RequestStatus,
    /// Admin notes recorded at resolution.
    pub admin_notes: Option<String>,
    /// Admin who resolved the request.
    pub resolved_by: Option<UserId>,
    /// When the request was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

/// One IMEI lookup attempt, logged for quota accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    /// User who searched.
    pub user_id: UserId,
    /// Normalized search term.
    pub search_term: String,
    /// Whether a device row matched (independent of warranty visibility).
    pub device_found: bool,
    /// The matched device, if any.
    pub device_id: Option<DeviceId>,
    /// When the search happened.
    pub created_at: DateTime<Utc>,
}

/// A lab's price for a catalog repair type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPrice {
    /// Lab the price belongs to.
    pub lab_id: UserId,
    /// Repair type the price covers.
    pub repair_type_id: RepairTypeId,
    /// Price in agorot/cents.
    pub price: i64,
    /// Whether the price is currently offered.
    pub is_active: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// IMEI normalization
// ═══════════════════════════════════════════════════════════════════════

/// Normalize a raw IMEI input: strip whitespace and dashes.
///
/// Lookups compare the normalized form against both `imei` and `imei2`.
///
/// # Examples
///
/// ```
/// use warrantydesk_core::domain::normalize_imei;
///
/// assert_eq!(normalize_imei(" 3568-8004-1234567 "), "356880041234567");
/// assert_eq!(normalize_imei("356880041234567"), "356880041234567");
/// ```
#[must_use]
pub fn normalize_imei(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_dashes() {
        assert_eq!(normalize_imei("35 68 80-04-1234567"), "356880041234567");
        assert_eq!(normalize_imei("\t356880041234567\n"), "356880041234567");
    }

    #[test]
    fn normalize_leaves_clean_input_alone() {
        assert_eq!(normalize_imei("356880041234567"), "356880041234567");
    }

    #[test]
    fn open_repair_statuses() {
        assert!(RepairStatus::Received.is_open());
        assert!(RepairStatus::InProgress.is_open());
        assert!(!RepairStatus::Completed.is_open());
        assert!(!RepairStatus::ReplacementRequested.is_open());
        assert!(!RepairStatus::Cancelled.is_open());
    }
}
