//! String-backed enumerations stored in `varchar` columns.
//!
//! Each enum serializes to the exact column value and parses back through
//! `FromStr`, returning `ModelError::Validation` for unknown values.

use crate::errors::ModelError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident ($label:literal) { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $value),+ }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(ModelError::Validation(format!("'{}' is not a valid {}", other, $label))),
                }
            }
        }
    };
}

string_enum! {
    /// Account role. Barbershops are tenants; admins own barbershops.
    Role ("role") {
        Customer => "customer",
        Barber => "barber",
        Barbershop => "barbershop",
        Admin => "admin",
        SuperAdmin => "super_admin",
    }
}

string_enum! {
    AppointmentStatus ("appointment status") {
        Confirmed => "confirmed",
        Pending => "pending",
        Cancelled => "cancelled",
        Completed => "completed",
        NoShow => "no_show",
    }
}

string_enum! {
    PaymentMethod ("payment method") {
        Cash => "Cash",
        Upi => "UPI",
        Card => "Card",
        Paytm => "Paytm",
    }
}

string_enum! {
    StaffRole ("staff role") {
        Barber => "Barber",
        SeniorBarber => "Senior Barber",
        Manager => "Manager",
        Receptionist => "Receptionist",
    }
}

string_enum! {
    StaffStatus ("staff status") {
        Active => "Active",
        Inactive => "Inactive",
        OnLeave => "On Leave",
    }
}

string_enum! {
    InventoryCategory ("inventory category") {
        HairProducts => "Hair Products",
        Shaving => "Shaving",
        Tools => "Tools",
        Cleaning => "Cleaning",
        Other => "Other",
    }
}

string_enum! {
    StockStatus ("stock status") {
        OutOfStock => "out_of_stock",
        LowStock => "low_stock",
        InStock => "in_stock",
    }
}

string_enum! {
    SubscriptionPlan ("subscription plan") {
        Basic => "basic",
        Premium => "premium",
        Enterprise => "enterprise",
    }
}

string_enum! {
    SubscriptionStatus ("subscription status") {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
        Expired => "expired",
    }
}

string_enum! {
    LoginStatus ("login status") {
        Success => "success",
        Failed => "failed",
        Blocked => "blocked",
    }
}

string_enum! {
    /// Kinds of entries in a barbershop's activity log.
    ActionType ("action type") {
        AppointmentCreated => "appointment_created",
        AppointmentUpdated => "appointment_updated",
        AppointmentCancelled => "appointment_cancelled",
        AppointmentCompleted => "appointment_completed",
        SaleRecorded => "sale_recorded",
        SaleUpdated => "sale_updated",
        StaffAdded => "staff_added",
        StaffUpdated => "staff_updated",
        CustomerAdded => "customer_added",
        CustomerUpdated => "customer_updated",
        InventoryAdded => "inventory_added",
        InventoryUpdated => "inventory_updated",
        InventoryLowStock => "inventory_low_stock",
        ServiceAdded => "service_added",
        ServiceUpdated => "service_updated",
        ServiceDeleted => "service_deleted",
        Login => "login",
        ProfileUpdated => "profile_updated",
        SettingsChanged => "settings_changed",
        TimeBlocked => "time_blocked",
        WalkInAppointment => "walk_in_appointment",
        QuickSale => "quick_sale",
    }
}

impl Role {
    /// Roles allowed to manage other accounts.
    pub fn is_admin_level(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl AppointmentStatus {
    /// Statuses that hold a slot on the schedule.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Confirmed | AppointmentStatus::Pending)
    }
}

impl StaffRole {
    pub fn is_barber(&self) -> bool {
        matches!(self, StaffRole::Barber | StaffRole::SeniorBarber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_column_values() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), *role);
        }
        assert_eq!(StaffRole::from_str("Senior Barber").unwrap(), StaffRole::SeniorBarber);
        assert_eq!(PaymentMethod::Upi.to_string(), "UPI");
    }

    #[test]
    fn unknown_value_is_validation_error() {
        let err = AppointmentStatus::from_str("done").unwrap_err();
        assert!(err.to_string().contains("'done' is not a valid appointment status"));
    }

    #[test]
    fn serde_uses_column_values() {
        let v = serde_json::to_value(StaffStatus::OnLeave).unwrap();
        assert_eq!(v, serde_json::json!("On Leave"));
        let parsed: InventoryCategory = serde_json::from_value(serde_json::json!("Hair Products")).unwrap();
        assert_eq!(parsed, InventoryCategory::HairProducts);
    }

    #[test]
    fn slot_holding_statuses() {
        assert!(AppointmentStatus::Pending.occupies_slot());
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
        assert!(!AppointmentStatus::Completed.occupies_slot());
    }
}
