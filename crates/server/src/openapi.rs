use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

// auth

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// `customer` (default) or `barber`
    pub role: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct RefreshRequest { pub refresh: String }

#[derive(ToSchema)]
pub struct TokenRequest { pub token: String }

#[derive(ToSchema)]
pub struct EmailRequest { pub email: String }

#[derive(ToSchema)]
pub struct ChangePasswordRequest { pub old_password: String, pub new_password: String, pub new_password_confirm: String }

#[derive(ToSchema)]
pub struct ResetPasswordRequest { pub token: String, pub new_password: String, pub new_password_confirm: String }

#[derive(ToSchema)]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// YYYY-MM-DD
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub shop_name: Option<String>,
    pub shop_owner_name: Option<String>,
}

// barbershop operations

#[derive(ToSchema)]
pub struct AppointmentRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub barber_name: String,
    /// YYYY-MM-DD
    pub appointment_date: String,
    /// HH:MM or HH:MM:SS
    pub appointment_time: String,
    pub duration_minutes: Option<i32>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

#[derive(ToSchema)]
pub struct AdminAppointmentRequest {
    pub barbershop_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub service: String,
    pub barber_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub duration_minutes: Option<i32>,
}

#[derive(ToSchema)]
pub struct StatusRequest {
    /// confirmed, pending, cancelled, completed or no_show
    pub status: String,
}

#[derive(ToSchema)]
pub struct SaleRequest {
    pub customer_name: String,
    pub service: String,
    pub barber_name: String,
    pub amount: f64,
    /// Cash, UPI, Card or Paytm
    pub payment_method: String,
    pub appointment_id: Option<Uuid>,
    pub notes: Option<String>,
    pub sale_date: Option<String>,
}

#[derive(ToSchema)]
pub struct StaffRequest {
    pub name: String,
    /// Barber, Senior Barber, Manager or Receptionist
    pub role: String,
    pub phone: String,
    pub email: Option<String>,
    pub schedule: Option<String>,
    pub status: Option<String>,
    pub salary: Option<f64>,
    pub join_date: Option<String>,
}

#[derive(ToSchema)]
pub struct AvailabilityRequest {
    pub staff_id: Uuid,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_available: Option<bool>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct CustomerRequest { pub name: String, pub phone: String, pub email: Option<String>, pub notes: Option<String> }

#[derive(ToSchema)]
pub struct InventoryRequest {
    pub name: String,
    /// Hair Products, Shaving, Tools, Cleaning or Other
    pub category: String,
    pub quantity: i32,
    pub min_stock: Option<i32>,
    pub unit_cost: f64,
    pub selling_price: f64,
    pub supplier: Option<String>,
}

#[derive(ToSchema)]
pub struct ServiceRequest { pub name: String, pub price: f64, pub description: Option<String>, pub is_active: Option<bool> }

#[derive(ToSchema)]
pub struct BlockSlotRequest { pub date: String, pub time: String, pub barber_name: String, pub reason: Option<String> }

#[derive(ToSchema)]
pub struct QuickAppointmentRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub service: String,
    pub barber_name: String,
}

#[derive(ToSchema)]
pub struct QuickSaleRequest {
    pub customer_name: Option<String>,
    pub service: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub barber_name: String,
}

// operators

#[derive(ToSchema)]
pub struct ManagedAccountRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

#[derive(ToSchema)]
pub struct BarbershopRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
    pub shop_name: String,
    pub shop_owner_name: String,
    /// basic (default), premium or enterprise
    pub plan: Option<String>,
}

#[derive(ToSchema)]
pub struct BarbershopPatchRequest {
    pub shop_name: Option<String>,
    pub shop_owner_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub plan: Option<String>,
    pub subscription_status: Option<String>,
}

#[derive(ToSchema)]
pub struct TransferOwnershipRequest { pub to_admin_id: Uuid }

#[derive(ToSchema)]
pub struct TransferBarbershopRequest { pub barbershop_id: Uuid, pub to_admin_id: Uuid }

#[derive(ToSchema)]
pub struct RestoreRequest {
    pub user_id: Uuid,
    /// admin or barbershop
    pub user_type: String,
}

#[derive(ToSchema)]
pub struct RestoreBarbershopRequest { pub user_id: Uuid }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::refresh,
        crate::routes::auth::verify_email_link,
        crate::routes::auth::verify_email,
        crate::routes::auth::resend_verification,
        crate::routes::auth::change_password,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::profile,
        crate::routes::auth::update_profile,
        crate::routes::auth::users,
        crate::routes::barbershop::profile,
        crate::routes::barbershop::update_profile,
        crate::routes::barbershop::list_appointments,
        crate::routes::barbershop::create_appointment,
        crate::routes::barbershop::today_appointments,
        crate::routes::barbershop::get_appointment,
        crate::routes::barbershop::update_appointment,
        crate::routes::barbershop::set_appointment_status,
        crate::routes::barbershop::delete_appointment,
        crate::routes::barbershop::list_sales,
        crate::routes::barbershop::create_sale,
        crate::routes::barbershop::daily_summary,
        crate::routes::barbershop::get_sale,
        crate::routes::barbershop::update_sale,
        crate::routes::barbershop::delete_sale,
        crate::routes::barbershop::list_staff,
        crate::routes::barbershop::create_staff,
        crate::routes::barbershop::active_barbers,
        crate::routes::barbershop::get_staff,
        crate::routes::barbershop::update_staff,
        crate::routes::barbershop::delete_staff,
        crate::routes::barbershop::list_availability,
        crate::routes::barbershop::upsert_availability,
        crate::routes::barbershop::get_availability,
        crate::routes::barbershop::update_availability,
        crate::routes::barbershop::delete_availability,
        crate::routes::barbershop::list_customers,
        crate::routes::barbershop::create_customer,
        crate::routes::barbershop::get_customer,
        crate::routes::barbershop::update_customer,
        crate::routes::barbershop::delete_customer,
        crate::routes::barbershop::update_customer_stats,
        crate::routes::barbershop::list_inventory,
        crate::routes::barbershop::create_inventory,
        crate::routes::barbershop::low_stock,
        crate::routes::barbershop::get_inventory,
        crate::routes::barbershop::update_inventory,
        crate::routes::barbershop::delete_inventory,
        crate::routes::barbershop::list_services,
        crate::routes::barbershop::create_service,
        crate::routes::barbershop::active_services,
        crate::routes::barbershop::get_service,
        crate::routes::barbershop::update_service,
        crate::routes::barbershop::delete_service,
        crate::routes::barbershop::activity_logs,
        crate::routes::barbershop::dashboard_stats,
        crate::routes::barbershop::monthly_revenue,
        crate::routes::barbershop::service_popularity,
        crate::routes::barbershop::staff_performance,
        crate::routes::barbershop::report_summary,
        crate::routes::barbershop::report_analytics,
        crate::routes::barbershop::report_export,
        crate::routes::barbershop::calendar,
        crate::routes::barbershop::schedule_grid,
        crate::routes::barbershop::available_slots,
        crate::routes::barbershop::block_slot,
        crate::routes::barbershop::quick_appointment,
        crate::routes::barbershop::quick_sale,
        crate::routes::super_admin::dashboard_stats,
        crate::routes::super_admin::dashboard_data,
        crate::routes::super_admin::list_admins,
        crate::routes::super_admin::create_admin,
        crate::routes::super_admin::get_admin,
        crate::routes::super_admin::update_admin,
        crate::routes::super_admin::delete_admin,
        crate::routes::super_admin::toggle_admin,
        crate::routes::super_admin::transfer_ownership,
        crate::routes::super_admin::admin_barbershops,
        crate::routes::super_admin::list_barbershops,
        crate::routes::super_admin::create_barbershop,
        crate::routes::super_admin::get_barbershop,
        crate::routes::super_admin::update_barbershop,
        crate::routes::super_admin::delete_barbershop,
        crate::routes::super_admin::toggle_barbershop,
        crate::routes::super_admin::archived_admins,
        crate::routes::super_admin::archived_barbershops,
        crate::routes::super_admin::restore,
        crate::routes::admin::dashboard_stats,
        crate::routes::admin::dashboard_data,
        crate::routes::admin::activities,
        crate::routes::admin::list_appointments,
        crate::routes::admin::create_appointment,
        crate::routes::admin::get_appointment,
        crate::routes::admin::update_appointment,
        crate::routes::admin::delete_appointment,
        crate::routes::admin::list_barbershops,
        crate::routes::admin::create_barbershop,
        crate::routes::admin::get_barbershop,
        crate::routes::admin::update_barbershop,
        crate::routes::admin::delete_barbershop,
        crate::routes::admin::toggle_barbershop,
        crate::routes::admin::barbershop_analytics,
        crate::routes::admin::archived_barbershops,
        crate::routes::admin::restore_barbershop,
        crate::routes::admin::transfer_barbershop,
        crate::routes::admin::available_admins,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenRequest,
            EmailRequest,
            ChangePasswordRequest,
            ResetPasswordRequest,
            ProfileRequest,
            AppointmentRequest,
            AdminAppointmentRequest,
            StatusRequest,
            SaleRequest,
            StaffRequest,
            AvailabilityRequest,
            CustomerRequest,
            InventoryRequest,
            ServiceRequest,
            BlockSlotRequest,
            QuickAppointmentRequest,
            QuickSaleRequest,
            ManagedAccountRequest,
            BarbershopRequest,
            BarbershopPatchRequest,
            TransferOwnershipRequest,
            TransferBarbershopRequest,
            RestoreRequest,
            RestoreBarbershopRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "barbershop"),
        (name = "super-admin"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
