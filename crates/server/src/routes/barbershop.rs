//! Tenant endpoints under `/api/barbershop`. The caller's own user id scopes every query.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use common::types::{ApiMessage, ApiResponse};
use models::appointment::AppointmentView;
use models::enums::{AppointmentStatus, Role};
use models::inventory_item::InventoryView;
use models::shop_service::ShopServiceView;
use models::staff::StaffView;
use models::{activity_log, customer, sale};
use serde::Deserialize;
use service::accounts::{self, ProfilePatch, UserView};
use service::activity::{self, ActivityFilter};
use service::appointments::{self, AppointmentFilter, AppointmentInput, AppointmentPatch};
use service::catalog::{self, ServiceFilter, ServiceInput, ServicePatch};
use service::customers::{self, CustomerInput, CustomerPatch};
use service::dashboard::{self, DashboardStats, MonthlyRevenue, ServicePopularity, StaffPerformance};
use service::errors::ServiceError;
use service::inventory::{self, InventoryFilter, InventoryInput, InventoryPatch};
use service::quick::{self, QuickAppointmentInput, QuickSaleInput};
use service::reports::{self, Analytics, Export, ReportSummary};
use service::sales::{self, DailySummary, SaleFilter, SaleInput, SalePatch};
use service::schedule::{self, AvailableSlots, BlockSlotInput, CalendarEntry, ScheduleGrid};
use service::staff::{self, AvailabilityFilter, AvailabilityInput, AvailabilityPatch, AvailabilityView, BarberRef, StaffFilter, StaffInput, StaffPatch};
use uuid::Uuid;

use crate::auth::{AuthContext, ServerState};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, done, ok, ApiResult, Created};

fn tenant(ctx: &AuthContext) -> Result<Uuid, JsonApiError> {
    Ok(ctx.require(&[Role::Barbershop])?.user_id)
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// `date` stays raw so a missing or malformed value gets a specific message.
#[derive(Debug, Default, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
    pub barber: Option<String>,
}

// profile

#[utoipa::path(get, path = "/api/barbershop/profile", tag = "barbershop", responses((status = 200, description = "Shop profile")))]
pub async fn profile(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<UserView> {
    let shop = tenant(&ctx)?;
    ok("Profile retrieved", accounts::get_profile(&state.db, shop).await?)
}

#[utoipa::path(put, path = "/api/barbershop/profile", tag = "barbershop", request_body = crate::openapi::ProfileRequest,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation failed")))]
pub async fn update_profile(State(state): State<ServerState>, ctx: AuthContext, ApiJson(patch): ApiJson<ProfilePatch>) -> ApiResult<UserView> {
    let shop = tenant(&ctx)?;
    ok("Profile updated successfully", accounts::update_profile(&state.db, shop, patch).await?)
}

// appointments

#[utoipa::path(get, path = "/api/barbershop/appointments", tag = "barbershop", responses((status = 200, description = "Appointments")))]
pub async fn list_appointments(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<AppointmentFilter>,
) -> ApiResult<Vec<AppointmentView>> {
    let shop = tenant(&ctx)?;
    ok("Appointments retrieved", appointments::list(&state.db, shop, filter).await?)
}

#[utoipa::path(post, path = "/api/barbershop/appointments", tag = "barbershop", request_body = crate::openapi::AppointmentRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Slot taken")))]
pub async fn create_appointment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<AppointmentInput>,
) -> Created<AppointmentView> {
    let shop = tenant(&ctx)?;
    created("Appointment created successfully", appointments::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/appointments/today", tag = "barbershop", responses((status = 200, description = "Today's appointments")))]
pub async fn today_appointments(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<AppointmentView>> {
    let shop = tenant(&ctx)?;
    ok("Today's appointments retrieved", appointments::today(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/appointments/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Appointment id")),
    responses((status = 200, description = "Appointment"), (status = 404, description = "Not found")))]
pub async fn get_appointment(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AppointmentView> {
    let shop = tenant(&ctx)?;
    ok("Appointment retrieved", appointments::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/appointments/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = crate::openapi::AppointmentRequest,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Slot taken")))]
pub async fn update_appointment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AppointmentPatch>,
) -> ApiResult<AppointmentView> {
    let shop = tenant(&ctx)?;
    ok("Appointment updated successfully", appointments::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(patch, path = "/api/barbershop/appointments/{id}/status", tag = "barbershop", params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = crate::openapi::StatusRequest,
    responses((status = 200, description = "Updated"), (status = 400, description = "Unknown status"), (status = 404, description = "Not found")))]
pub async fn set_appointment_status(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<StatusInput>,
) -> ApiResult<AppointmentView> {
    let shop = tenant(&ctx)?;
    let status: AppointmentStatus = input.status.trim().parse().map_err(ServiceError::from)?;
    ok("Appointment status updated", appointments::set_status(&state.db, shop, id, status).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/appointments/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Appointment id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_appointment(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    appointments::delete(&state.db, shop, id).await?;
    done("Appointment deleted successfully")
}

// sales

#[utoipa::path(get, path = "/api/barbershop/sales", tag = "barbershop", responses((status = 200, description = "Sales")))]
pub async fn list_sales(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(filter): ApiQuery<SaleFilter>) -> ApiResult<Vec<sale::Model>> {
    let shop = tenant(&ctx)?;
    ok("Sales retrieved", sales::list(&state.db, shop, filter).await?)
}

#[utoipa::path(post, path = "/api/barbershop/sales", tag = "barbershop", request_body = crate::openapi::SaleRequest,
    responses((status = 201, description = "Recorded"), (status = 400, description = "Validation failed"), (status = 409, description = "Appointment already billed")))]
pub async fn create_sale(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<SaleInput>) -> Created<sale::Model> {
    let shop = tenant(&ctx)?;
    created("Sale recorded successfully", sales::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/sales/daily-summary", tag = "barbershop", responses((status = 200, description = "Daily summary")))]
pub async fn daily_summary(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<DateQuery>) -> ApiResult<DailySummary> {
    let shop = tenant(&ctx)?;
    ok("Daily summary retrieved", sales::daily_summary(&state.db, shop, q.date).await?)
}

#[utoipa::path(get, path = "/api/barbershop/sales/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Sale id")),
    responses((status = 200, description = "Sale"), (status = 404, description = "Not found")))]
pub async fn get_sale(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<sale::Model> {
    let shop = tenant(&ctx)?;
    ok("Sale retrieved", sales::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/sales/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Sale id")),
    request_body = crate::openapi::SaleRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_sale(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SalePatch>,
) -> ApiResult<sale::Model> {
    let shop = tenant(&ctx)?;
    ok("Sale updated successfully", sales::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/sales/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Sale id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_sale(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    sales::delete(&state.db, shop, id).await?;
    done("Sale deleted successfully")
}

// staff

#[utoipa::path(get, path = "/api/barbershop/staff", tag = "barbershop", responses((status = 200, description = "Staff")))]
pub async fn list_staff(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(filter): ApiQuery<StaffFilter>) -> ApiResult<Vec<StaffView>> {
    let shop = tenant(&ctx)?;
    ok("Staff retrieved", staff::list(&state.db, shop, filter).await?)
}

#[utoipa::path(post, path = "/api/barbershop/staff", tag = "barbershop", request_body = crate::openapi::StaffRequest,
    responses((status = 201, description = "Added"), (status = 400, description = "Validation failed"), (status = 409, description = "Phone taken")))]
pub async fn create_staff(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<StaffInput>) -> Created<StaffView> {
    let shop = tenant(&ctx)?;
    created("Staff member added successfully", staff::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/staff/active-barbers", tag = "barbershop", responses((status = 200, description = "Active barbers")))]
pub async fn active_barbers(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<BarberRef>> {
    let shop = tenant(&ctx)?;
    ok("Active barbers retrieved", staff::active_barbers(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/staff/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Staff id")),
    responses((status = 200, description = "Staff member"), (status = 404, description = "Not found")))]
pub async fn get_staff(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<StaffView> {
    let shop = tenant(&ctx)?;
    ok("Staff member retrieved", staff::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/staff/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Staff id")),
    request_body = crate::openapi::StaffRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_staff(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<StaffPatch>,
) -> ApiResult<StaffView> {
    let shop = tenant(&ctx)?;
    ok("Staff member updated successfully", staff::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/staff/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Staff id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_staff(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    staff::delete(&state.db, shop, id).await?;
    done("Staff member deleted successfully")
}

// staff availability

#[utoipa::path(get, path = "/api/barbershop/staff/availability", tag = "barbershop", responses((status = 200, description = "Availability")))]
pub async fn list_availability(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<AvailabilityFilter>,
) -> ApiResult<Vec<AvailabilityView>> {
    let shop = tenant(&ctx)?;
    ok("Availability retrieved", staff::list_availability(&state.db, shop, filter).await?)
}

/// 201 when a row was created, 200 when an existing (staff, date, start) row was updated.
#[utoipa::path(post, path = "/api/barbershop/staff/availability", tag = "barbershop", request_body = crate::openapi::AvailabilityRequest,
    responses((status = 200, description = "Updated"), (status = 201, description = "Created"), (status = 400, description = "Validation failed")))]
pub async fn upsert_availability(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<AvailabilityInput>,
) -> Created<AvailabilityView> {
    let shop = tenant(&ctx)?;
    let (view, was_created) = staff::upsert_availability(&state.db, shop, input).await?;
    if was_created {
        created("Availability created successfully", view)
    } else {
        Ok((StatusCode::OK, Json(ApiResponse::ok("Availability updated successfully", view))))
    }
}

#[utoipa::path(get, path = "/api/barbershop/staff/availability/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Availability id")),
    responses((status = 200, description = "Availability"), (status = 404, description = "Not found")))]
pub async fn get_availability(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AvailabilityView> {
    let shop = tenant(&ctx)?;
    ok("Availability retrieved", staff::get_availability(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/staff/availability/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Availability id")),
    request_body = crate::openapi::AvailabilityRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_availability(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AvailabilityPatch>,
) -> ApiResult<AvailabilityView> {
    let shop = tenant(&ctx)?;
    ok("Availability updated successfully", staff::update_availability(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/staff/availability/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Availability id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_availability(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    staff::delete_availability(&state.db, shop, id).await?;
    done("Availability deleted successfully")
}

// customers

#[utoipa::path(get, path = "/api/barbershop/customers", tag = "barbershop", responses((status = 200, description = "Customers")))]
pub async fn list_customers(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<SearchQuery>) -> ApiResult<Vec<customer::Model>> {
    let shop = tenant(&ctx)?;
    ok("Customers retrieved", customers::list(&state.db, shop, q.search).await?)
}

#[utoipa::path(post, path = "/api/barbershop/customers", tag = "barbershop", request_body = crate::openapi::CustomerRequest,
    responses((status = 201, description = "Added"), (status = 409, description = "Phone taken")))]
pub async fn create_customer(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<CustomerInput>) -> Created<customer::Model> {
    let shop = tenant(&ctx)?;
    created("Customer added successfully", customers::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/customers/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Customer id")),
    responses((status = 200, description = "Customer"), (status = 404, description = "Not found")))]
pub async fn get_customer(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<customer::Model> {
    let shop = tenant(&ctx)?;
    ok("Customer retrieved", customers::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/customers/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Customer id")),
    request_body = crate::openapi::CustomerRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_customer(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<CustomerPatch>,
) -> ApiResult<customer::Model> {
    let shop = tenant(&ctx)?;
    ok("Customer updated successfully", customers::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/customers/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Customer id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_customer(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    customers::delete(&state.db, shop, id).await?;
    done("Customer deleted successfully")
}

#[utoipa::path(post, path = "/api/barbershop/customers/{id}/update-stats", tag = "barbershop", params(("id" = Uuid, Path, description = "Customer id")),
    responses((status = 200, description = "Stats refreshed"), (status = 404, description = "Not found")))]
pub async fn update_customer_stats(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<customer::Model> {
    let shop = tenant(&ctx)?;
    ok("Customer stats updated", customers::update_stats(&state.db, shop, id).await?)
}

// inventory

#[utoipa::path(get, path = "/api/barbershop/inventory", tag = "barbershop", responses((status = 200, description = "Inventory")))]
pub async fn list_inventory(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(filter): ApiQuery<InventoryFilter>) -> ApiResult<Vec<InventoryView>> {
    let shop = tenant(&ctx)?;
    ok("Inventory retrieved", inventory::list(&state.db, shop, filter).await?)
}

#[utoipa::path(post, path = "/api/barbershop/inventory", tag = "barbershop", request_body = crate::openapi::InventoryRequest,
    responses((status = 201, description = "Added"), (status = 409, description = "Name taken")))]
pub async fn create_inventory(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<InventoryInput>) -> Created<InventoryView> {
    let shop = tenant(&ctx)?;
    created("Inventory item added successfully", inventory::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/inventory/low-stock", tag = "barbershop", responses((status = 200, description = "Low stock items")))]
pub async fn low_stock(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<InventoryView>> {
    let shop = tenant(&ctx)?;
    ok("Low stock items retrieved", inventory::low_stock(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/inventory/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Item id")),
    responses((status = 200, description = "Item"), (status = 404, description = "Not found")))]
pub async fn get_inventory(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<InventoryView> {
    let shop = tenant(&ctx)?;
    ok("Inventory item retrieved", inventory::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/inventory/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Item id")),
    request_body = crate::openapi::InventoryRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_inventory(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<InventoryPatch>,
) -> ApiResult<InventoryView> {
    let shop = tenant(&ctx)?;
    ok("Inventory item updated successfully", inventory::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/inventory/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Item id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_inventory(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    inventory::delete(&state.db, shop, id).await?;
    done("Inventory item deleted successfully")
}

// service catalog

#[utoipa::path(get, path = "/api/barbershop/services", tag = "barbershop", responses((status = 200, description = "Services")))]
pub async fn list_services(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(filter): ApiQuery<ServiceFilter>) -> ApiResult<Vec<ShopServiceView>> {
    let shop = tenant(&ctx)?;
    ok("Services retrieved", catalog::list(&state.db, shop, filter).await?)
}

#[utoipa::path(post, path = "/api/barbershop/services", tag = "barbershop", request_body = crate::openapi::ServiceRequest,
    responses((status = 201, description = "Added"), (status = 409, description = "Name taken")))]
pub async fn create_service(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<ServiceInput>) -> Created<ShopServiceView> {
    let shop = tenant(&ctx)?;
    created("Service added successfully", catalog::create(&state.db, shop, input).await?)
}

#[utoipa::path(get, path = "/api/barbershop/services/active", tag = "barbershop", responses((status = 200, description = "Active services")))]
pub async fn active_services(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<ShopServiceView>> {
    let shop = tenant(&ctx)?;
    ok("Active services retrieved", catalog::active(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/services/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Service id")),
    responses((status = 200, description = "Service"), (status = 404, description = "Not found")))]
pub async fn get_service(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ShopServiceView> {
    let shop = tenant(&ctx)?;
    ok("Service retrieved", catalog::get(&state.db, shop, id).await?)
}

#[utoipa::path(put, path = "/api/barbershop/services/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ServiceRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_service(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ServicePatch>,
) -> ApiResult<ShopServiceView> {
    let shop = tenant(&ctx)?;
    ok("Service updated successfully", catalog::update(&state.db, shop, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/barbershop/services/{id}", tag = "barbershop", params(("id" = Uuid, Path, description = "Service id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_service(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let shop = tenant(&ctx)?;
    catalog::delete(&state.db, shop, id).await?;
    done("Service deleted successfully")
}

// activity log

#[utoipa::path(get, path = "/api/barbershop/activity-logs", tag = "barbershop", responses((status = 200, description = "Newest 100 entries")))]
pub async fn activity_logs(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<ActivityFilter>,
) -> ApiResult<Vec<activity_log::Model>> {
    let shop = tenant(&ctx)?;
    ok("Activity logs retrieved", activity::list_recent(&state.db, shop, filter).await?)
}

// dashboard

#[utoipa::path(get, path = "/api/barbershop/dashboard/stats", tag = "barbershop", responses((status = 200, description = "Counters")))]
pub async fn dashboard_stats(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<DashboardStats> {
    let shop = tenant(&ctx)?;
    ok("Dashboard stats retrieved", dashboard::stats(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/dashboard/monthly-revenue", tag = "barbershop", responses((status = 200, description = "Last 12 months")))]
pub async fn monthly_revenue(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<MonthlyRevenue>> {
    let shop = tenant(&ctx)?;
    ok("Monthly revenue retrieved", dashboard::monthly_revenue(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/dashboard/service-popularity", tag = "barbershop", responses((status = 200, description = "Sales by service")))]
pub async fn service_popularity(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<ServicePopularity>> {
    let shop = tenant(&ctx)?;
    ok("Service popularity retrieved", dashboard::service_popularity(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/dashboard/staff-performance", tag = "barbershop", responses((status = 200, description = "Sales by barber")))]
pub async fn staff_performance(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<StaffPerformance>> {
    let shop = tenant(&ctx)?;
    ok("Staff performance retrieved", dashboard::staff_performance(&state.db, shop).await?)
}

// reports

#[utoipa::path(get, path = "/api/barbershop/reports/summary", tag = "barbershop",
    responses((status = 200, description = "Summary for the range"), (status = 400, description = "Bad range")))]
pub async fn report_summary(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<RangeQuery>) -> ApiResult<ReportSummary> {
    let shop = tenant(&ctx)?;
    ok("Report summary retrieved", reports::summary(&state.db, shop, q.start_date, q.end_date).await?)
}

#[utoipa::path(get, path = "/api/barbershop/reports/analytics", tag = "barbershop", responses((status = 200, description = "30 day analytics")))]
pub async fn report_analytics(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Analytics> {
    let shop = tenant(&ctx)?;
    ok("Analytics retrieved", reports::analytics(&state.db, shop).await?)
}

#[utoipa::path(get, path = "/api/barbershop/reports/export", tag = "barbershop",
    responses((status = 200, description = "Export payload"), (status = 400, description = "Unknown export type")))]
pub async fn report_export(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<ExportQuery>) -> ApiResult<Export> {
    let shop = tenant(&ctx)?;
    let export = reports::export(&state.db, shop, q.kind.as_deref(), q.start_date, q.end_date).await?;
    ok("Data exported successfully", export)
}

// calendar and schedule

#[utoipa::path(get, path = "/api/barbershop/calendar", tag = "barbershop", responses((status = 200, description = "Appointments by day")))]
pub async fn calendar(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(q): ApiQuery<CalendarQuery>,
) -> ApiResult<BTreeMap<String, Vec<CalendarEntry>>> {
    let shop = tenant(&ctx)?;
    ok("Calendar retrieved", schedule::calendar(&state.db, shop, q.month, q.year).await?)
}

#[utoipa::path(get, path = "/api/barbershop/schedule/grid", tag = "barbershop", responses((status = 200, description = "Day grid")))]
pub async fn schedule_grid(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<DateQuery>) -> ApiResult<ScheduleGrid> {
    let shop = tenant(&ctx)?;
    ok("Schedule grid retrieved", schedule::grid(&state.db, shop, q.date).await?)
}

#[utoipa::path(get, path = "/api/barbershop/schedule/available-slots", tag = "barbershop",
    responses((status = 200, description = "Slots"), (status = 400, description = "Missing or malformed date")))]
pub async fn available_slots(State(state): State<ServerState>, ctx: AuthContext, ApiQuery(q): ApiQuery<SlotsQuery>) -> ApiResult<AvailableSlots> {
    let shop = tenant(&ctx)?;
    ok("Available slots retrieved", schedule::available_slots(&state.db, shop, q.date.as_deref(), q.barber).await?)
}

#[utoipa::path(post, path = "/api/barbershop/schedule/block-slot", tag = "barbershop", request_body = crate::openapi::BlockSlotRequest,
    responses((status = 201, description = "Blocked"), (status = 400, description = "Bad date or time"), (status = 409, description = "Slot taken")))]
pub async fn block_slot(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<BlockSlotInput>) -> Created<AppointmentView> {
    let shop = tenant(&ctx)?;
    created("Time slot blocked successfully", schedule::block_slot(&state.db, shop, input).await?.view())
}

// quick actions

#[utoipa::path(post, path = "/api/barbershop/quick/appointment", tag = "barbershop", request_body = crate::openapi::QuickAppointmentRequest,
    responses((status = 201, description = "Walk-in booked"), (status = 409, description = "Slot taken")))]
pub async fn quick_appointment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<QuickAppointmentInput>,
) -> Created<AppointmentView> {
    let shop = tenant(&ctx)?;
    created("Walk-in appointment created", quick::appointment(&state.db, shop, input).await?)
}

#[utoipa::path(post, path = "/api/barbershop/quick/sale", tag = "barbershop", request_body = crate::openapi::QuickSaleRequest,
    responses((status = 201, description = "Sale recorded"), (status = 400, description = "Validation failed")))]
pub async fn quick_sale(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<QuickSaleInput>) -> Created<sale::Model> {
    let shop = tenant(&ctx)?;
    created("Quick sale recorded", quick::sale(&state.db, shop, input).await?)
}
