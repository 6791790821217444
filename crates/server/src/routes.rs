use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::{require_bearer_token_state, ServerState};
use crate::openapi::ApiDoc;

pub mod admin;
pub mod auth;
pub mod barbershop;
pub mod super_admin;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/token/refresh", post(auth::refresh))
        .route("/verify-email", get(auth::verify_email_link).post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/change-password", post(auth::change_password))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/users", get(auth::users))
}

fn barbershop_routes() -> Router<ServerState> {
    use barbershop as b;
    Router::new()
        .route("/profile", get(b::profile).put(b::update_profile))
        .route("/appointments", get(b::list_appointments).post(b::create_appointment))
        .route("/appointments/today", get(b::today_appointments))
        .route("/appointments/:id", get(b::get_appointment).put(b::update_appointment).delete(b::delete_appointment))
        .route("/appointments/:id/status", patch(b::set_appointment_status))
        .route("/sales", get(b::list_sales).post(b::create_sale))
        .route("/sales/daily-summary", get(b::daily_summary))
        .route("/sales/:id", get(b::get_sale).put(b::update_sale).delete(b::delete_sale))
        .route("/staff", get(b::list_staff).post(b::create_staff))
        .route("/staff/active-barbers", get(b::active_barbers))
        .route("/staff/availability", get(b::list_availability).post(b::upsert_availability))
        .route(
            "/staff/availability/:id",
            get(b::get_availability).put(b::update_availability).delete(b::delete_availability),
        )
        .route("/staff/:id", get(b::get_staff).put(b::update_staff).delete(b::delete_staff))
        .route("/customers", get(b::list_customers).post(b::create_customer))
        .route("/customers/:id", get(b::get_customer).put(b::update_customer).delete(b::delete_customer))
        .route("/customers/:id/update-stats", post(b::update_customer_stats))
        .route("/inventory", get(b::list_inventory).post(b::create_inventory))
        .route("/inventory/low-stock", get(b::low_stock))
        .route("/inventory/:id", get(b::get_inventory).put(b::update_inventory).delete(b::delete_inventory))
        .route("/services", get(b::list_services).post(b::create_service))
        .route("/services/active", get(b::active_services))
        .route("/services/:id", get(b::get_service).put(b::update_service).delete(b::delete_service))
        .route("/activity-logs", get(b::activity_logs))
        .route("/dashboard/stats", get(b::dashboard_stats))
        .route("/dashboard/monthly-revenue", get(b::monthly_revenue))
        .route("/dashboard/service-popularity", get(b::service_popularity))
        .route("/dashboard/staff-performance", get(b::staff_performance))
        .route("/reports/summary", get(b::report_summary))
        .route("/reports/analytics", get(b::report_analytics))
        .route("/reports/export", get(b::report_export))
        .route("/calendar", get(b::calendar))
        .route("/schedule/grid", get(b::schedule_grid))
        .route("/schedule/available-slots", get(b::available_slots))
        .route("/schedule/block-slot", post(b::block_slot))
        .route("/quick/appointment", post(b::quick_appointment))
        .route("/quick/sale", post(b::quick_sale))
}

fn super_admin_routes() -> Router<ServerState> {
    use super_admin as s;
    Router::new()
        .route("/dashboard/stats", get(s::dashboard_stats))
        .route("/dashboard/data", get(s::dashboard_data))
        .route("/admins", get(s::list_admins).post(s::create_admin))
        .route("/admins/:id", get(s::get_admin).put(s::update_admin).delete(s::delete_admin))
        .route("/admins/:id/toggle-status", post(s::toggle_admin))
        .route("/admins/:id/transfer-ownership", post(s::transfer_ownership))
        .route("/admins/:id/barbershops", get(s::admin_barbershops))
        .route("/barbershops", get(s::list_barbershops).post(s::create_barbershop))
        .route("/barbershops/:id", get(s::get_barbershop).put(s::update_barbershop).delete(s::delete_barbershop))
        .route("/barbershops/:id/toggle-status", post(s::toggle_barbershop))
        .route("/archive/admins", get(s::archived_admins))
        .route("/archive/barbershops", get(s::archived_barbershops))
        .route("/archive/restore", post(s::restore))
}

fn admin_routes() -> Router<ServerState> {
    use admin as a;
    Router::new()
        .route("/dashboard/stats", get(a::dashboard_stats))
        .route("/dashboard/data", get(a::dashboard_data))
        .route("/activities", get(a::activities))
        .route("/appointments", get(a::list_appointments).post(a::create_appointment))
        .route("/appointments/:id", get(a::get_appointment).put(a::update_appointment).delete(a::delete_appointment))
        .route("/barbershops", get(a::list_barbershops).post(a::create_barbershop))
        .route("/barbershops/:id", get(a::get_barbershop).put(a::update_barbershop).delete(a::delete_barbershop))
        .route("/barbershops/:id/toggle-status", post(a::toggle_barbershop))
        .route("/barbershops/:id/analytics", get(a::barbershop_analytics))
        .route("/archive/barbershops", get(a::archived_barbershops))
        .route("/archive/restore", post(a::restore_barbershop))
        .route("/transfer/barbershop", post(a::transfer_barbershop))
        .route("/transfer/available-admins", get(a::available_admins))
}

/// Build the full application router: health, docs and the four API groups behind the bearer middleware.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/barbershop", barbershop_routes())
        .nest("/api/super-admin", super_admin_routes())
        .nest("/api/admin", admin_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token_state))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
