//! Role-based visibility rules.
//!
//! The confidentiality boundary in this system is customer data on a
//! warranty: a store may only see customers of warranties it activated,
//! while admins and labs see all. These rules are consumed by the search
//! operation and by every list/detail read; they are never bypassed for
//! "read-only" displays.

use crate::domain::{Role, UserId, Warranty};

/// Whether the requester may see the warranty's customer fields.
///
/// True for admins, for labs (labs service devices and hold the
/// customer's contact details on the repair anyway), and for the store
/// that activated the warranty.
///
/// # Examples
///
/// ```
/// # use warrantydesk_core::policy::can_view_warranty_details;
/// # use warrantydesk_core::domain::{Role, UserId, Warranty, DeviceId, WarrantyId};
/// # use chrono::Utc;
/// let store_a = UserId::new();
/// let store_b = UserId::new();
/// let warranty = Warranty {
///     id: WarrantyId::new(),
///     device_id: DeviceId::new(),
///     store_id: store_a,
///     activated_by: None,
///     customer_name: "Yossi".into(),
///     customer_phone: "0501234567".into(),
///     activation_date: Utc::now(),
///     expiry_date: Utc::now(),
///     is_active: true,
///     notes: None,
/// };
/// assert!(can_view_warranty_details(&warranty, store_a, Role::Store));
/// assert!(!can_view_warranty_details(&warranty, store_b, Role::Store));
/// assert!(can_view_warranty_details(&warranty, store_b, Role::Admin));
/// ```
#[must_use]
pub fn can_view_warranty_details(warranty: &Warranty, requester_id: UserId, role: Role) -> bool {
    match role {
        Role::Admin | Role::Lab => true,
        Role::Store => warranty.store_id == requester_id,
    }
}
