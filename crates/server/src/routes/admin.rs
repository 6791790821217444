//! Reseller admin endpoints under `/api/admin`, scoped to barbershops the caller created.

use axum::extract::State;
use axum::Json;
use common::types::ApiMessage;
use models::appointment::AppointmentView;
use models::enums::{Role, SubscriptionPlan};
use serde::Deserialize;
use service::accounts::{Actor, UserView};
use service::admin::{
    self, ActivityView, AdminActivityFilter, AdminAppointmentFilter, AdminAppointmentInput, AdminOption, AdminStats, BarbershopAnalytics,
    DashboardData, ToggleResult, TransferInput, TransferOutcome, ACTIVITY_PAGE_SIZE,
};
use service::appointments::AppointmentPatch;
use service::barbershops::{self, BarbershopCreate, BarbershopFilter, BarbershopPatch, BarbershopView, Scope};
use service::pagination::Page;
use uuid::Uuid;

use crate::auth::{AuthContext, ServerState};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, done, ok, ApiResult, Created, PageQuery};

fn admin(ctx: &AuthContext) -> Result<Actor, JsonApiError> {
    ctx.require(&[Role::Admin])
}

/// `?status=active|inactive` on the admin's barbershop list.
#[derive(Debug, Default, Deserialize)]
pub struct AdminBarbershopQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub plan: Option<SubscriptionPlan>,
}

impl AdminBarbershopQuery {
    fn into_filter(self) -> Result<BarbershopFilter, JsonApiError> {
        let is_active = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            Some(other) => return Err(JsonApiError::bad_request(format!("'{other}' is not a valid status; use active or inactive"))),
        };
        Ok(BarbershopFilter { search: self.search, is_active, plan: self.plan })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RestoreBarbershopInput {
    pub user_id: Uuid,
}

#[utoipa::path(get, path = "/api/admin/dashboard/stats", tag = "admin", responses((status = 200, description = "Counters over owned barbershops")))]
pub async fn dashboard_stats(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<AdminStats> {
    let actor = admin(&ctx)?;
    ok("Dashboard stats retrieved", admin::stats(&state.db, actor.user_id).await?)
}

#[utoipa::path(get, path = "/api/admin/dashboard/data", tag = "admin", responses((status = 200, description = "Stats with recent activity")))]
pub async fn dashboard_data(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<DashboardData> {
    let actor = admin(&ctx)?;
    ok("Dashboard data retrieved", admin::dashboard_data(&state.db, actor.user_id).await?)
}

#[utoipa::path(get, path = "/api/admin/activities", tag = "admin", params(PageQuery), responses((status = 200, description = "Activities, 50 per page by default")))]
pub async fn activities(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<AdminActivityFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<ActivityView>> {
    let actor = admin(&ctx)?;
    let page = page.pagination_or(ACTIVITY_PAGE_SIZE);
    ok("Activities retrieved", admin::activities(&state.db, actor.user_id, filter, page).await?)
}

// appointments

#[utoipa::path(get, path = "/api/admin/appointments", tag = "admin", params(PageQuery), responses((status = 200, description = "Appointments")))]
pub async fn list_appointments(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<AdminAppointmentFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<AppointmentView>> {
    let actor = admin(&ctx)?;
    ok("Appointments retrieved", admin::list_appointments(&state.db, actor.user_id, filter, page.pagination()).await?)
}

#[utoipa::path(post, path = "/api/admin/appointments", tag = "admin", request_body = crate::openapi::AdminAppointmentRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Not one of your barbershops"), (status = 409, description = "Slot taken")))]
pub async fn create_appointment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<AdminAppointmentInput>,
) -> Created<AppointmentView> {
    let actor = admin(&ctx)?;
    created("Appointment created successfully", admin::create_appointment(&state.db, actor.user_id, input).await?)
}

#[utoipa::path(get, path = "/api/admin/appointments/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Appointment id")),
    responses((status = 200, description = "Appointment"), (status = 404, description = "Not found")))]
pub async fn get_appointment(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AppointmentView> {
    let actor = admin(&ctx)?;
    ok("Appointment retrieved", admin::get_appointment(&state.db, actor.user_id, id).await?)
}

#[utoipa::path(put, path = "/api/admin/appointments/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = crate::openapi::AppointmentRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_appointment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AppointmentPatch>,
) -> ApiResult<AppointmentView> {
    let actor = admin(&ctx)?;
    ok("Appointment updated successfully", admin::update_appointment(&state.db, actor.user_id, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/admin/appointments/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Appointment id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_appointment(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let actor = admin(&ctx)?;
    admin::delete_appointment(&state.db, actor.user_id, id).await?;
    done("Appointment deleted successfully")
}

// barbershops

#[utoipa::path(get, path = "/api/admin/barbershops", tag = "admin", params(PageQuery),
    responses((status = 200, description = "Owned barbershops"), (status = 400, description = "Unknown status")))]
pub async fn list_barbershops(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(q): ApiQuery<AdminBarbershopQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<BarbershopView>> {
    let actor = admin(&ctx)?;
    let filter = q.into_filter()?;
    ok("Barbershops retrieved", barbershops::list(&state.db, Scope::OwnedBy(actor.user_id), filter, page.pagination()).await?)
}

#[utoipa::path(post, path = "/api/admin/barbershops", tag = "admin", request_body = crate::openapi::BarbershopRequest,
    responses((status = 201, description = "Created"), (status = 409, description = "Email or username taken")))]
pub async fn create_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<BarbershopCreate>) -> Created<BarbershopView> {
    let actor = admin(&ctx)?;
    created("Barbershop created successfully", barbershops::create(&state.db, &actor, input).await?)
}

#[utoipa::path(get, path = "/api/admin/barbershops/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Barbershop"), (status = 404, description = "Not found")))]
pub async fn get_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<BarbershopView> {
    let actor = admin(&ctx)?;
    ok("Barbershop retrieved", barbershops::get(&state.db, Scope::OwnedBy(actor.user_id), id).await?)
}

#[utoipa::path(put, path = "/api/admin/barbershops/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    request_body = crate::openapi::BarbershopPatchRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_barbershop(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<BarbershopPatch>,
) -> ApiResult<BarbershopView> {
    let actor = admin(&ctx)?;
    ok("Barbershop updated successfully", barbershops::update(&state.db, &actor, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/admin/barbershops/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Archived"), (status = 404, description = "Not found")))]
pub async fn delete_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let actor = admin(&ctx)?;
    admin::delete_barbershop(&state.db, &actor, id).await?;
    done("Barbershop deleted successfully")
}

#[utoipa::path(post, path = "/api/admin/barbershops/{id}/toggle-status", tag = "admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Toggled"), (status = 404, description = "Not found")))]
pub async fn toggle_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ToggleResult> {
    let actor = admin(&ctx)?;
    let result = admin::toggle_barbershop(&state.db, &actor, id).await?;
    let message = if result.is_active { "Barbershop activated" } else { "Barbershop deactivated" };
    ok(message, result)
}

#[utoipa::path(get, path = "/api/admin/barbershops/{id}/analytics", tag = "admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Analytics"), (status = 404, description = "Not found")))]
pub async fn barbershop_analytics(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<AnalyticsQuery>,
) -> ApiResult<BarbershopAnalytics> {
    let actor = admin(&ctx)?;
    ok("Analytics retrieved", admin::analytics(&state.db, actor.user_id, id, q.days).await?)
}

// archive

#[utoipa::path(get, path = "/api/admin/archive/barbershops", tag = "admin", responses((status = 200, description = "Archived barbershops")))]
pub async fn archived_barbershops(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<UserView>> {
    let actor = admin(&ctx)?;
    ok("Archived barbershops retrieved", barbershops::archived(&state.db, Scope::OwnedBy(actor.user_id)).await?)
}

#[utoipa::path(post, path = "/api/admin/archive/restore", tag = "admin", request_body = crate::openapi::RestoreBarbershopRequest,
    responses((status = 200, description = "Restored"), (status = 404, description = "No such archived barbershop")))]
pub async fn restore_barbershop(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<RestoreBarbershopInput>,
) -> ApiResult<UserView> {
    let actor = admin(&ctx)?;
    ok("Barbershop restored successfully", barbershops::restore(&state.db, Scope::OwnedBy(actor.user_id), input.user_id).await?)
}

// transfers

#[utoipa::path(post, path = "/api/admin/transfer/barbershop", tag = "admin", request_body = crate::openapi::TransferBarbershopRequest,
    responses((status = 200, description = "Transferred"), (status = 400, description = "Invalid target"), (status = 404, description = "Not found")))]
pub async fn transfer_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<TransferInput>) -> ApiResult<TransferOutcome> {
    let actor = ctx.require(&[Role::Admin, Role::SuperAdmin])?;
    ok("Barbershop transferred successfully", admin::transfer(&state.db, &actor, input).await?)
}

#[utoipa::path(get, path = "/api/admin/transfer/available-admins", tag = "admin", responses((status = 200, description = "Active admins except the caller")))]
pub async fn available_admins(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<AdminOption>> {
    let actor = ctx.require(&[Role::Admin, Role::SuperAdmin])?;
    ok("Available admins retrieved", admin::available_admins(&state.db, &actor).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_maps_to_is_active() {
        let q = AdminBarbershopQuery { status: Some("inactive".into()), ..Default::default() };
        assert_eq!(q.into_filter().ok().and_then(|f| f.is_active), Some(false));
        let q = AdminBarbershopQuery { status: Some("active".into()), ..Default::default() };
        assert_eq!(q.into_filter().ok().and_then(|f| f.is_active), Some(true));
        assert!(AdminBarbershopQuery::default().into_filter().ok().and_then(|f| f.is_active).is_none());
        let q = AdminBarbershopQuery { status: Some("paused".into()), ..Default::default() };
        assert!(q.into_filter().is_err());
    }
}
