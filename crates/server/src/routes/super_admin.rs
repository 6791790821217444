use axum::extract::State;
use axum::Json;
use common::types::ApiMessage;
use models::enums::Role;
use serde::Deserialize;
use service::accounts::{Actor, ManagedAccountInput, UserView};
use service::barbershops::{self, BarbershopCreate, BarbershopFilter, BarbershopPatch, BarbershopView, Scope};
use service::pagination::Page;
use service::super_admin::{self, AdminFilter, AdminPatch, AdminView, DashboardData, DashboardStats, RestoreInput, TransferResult};
use uuid::Uuid;

use crate::auth::{AuthContext, ServerState};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, done, ok, ApiResult, Created, PageQuery};

fn super_admin(ctx: &AuthContext) -> Result<Actor, JsonApiError> {
    ctx.require(&[Role::SuperAdmin])
}

/// Barbershop management is shared with admins, who only see their own shops.
fn operator(ctx: &AuthContext) -> Result<Actor, JsonApiError> {
    ctx.require(&[Role::SuperAdmin, Role::Admin])
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipInput {
    pub to_admin_id: Uuid,
}

#[utoipa::path(get, path = "/api/super-admin/dashboard/stats", tag = "super-admin", responses((status = 200, description = "Platform counters")))]
pub async fn dashboard_stats(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<DashboardStats> {
    super_admin(&ctx)?;
    ok("Dashboard stats retrieved", super_admin::stats(&state.db).await?)
}

#[utoipa::path(get, path = "/api/super-admin/dashboard/data", tag = "super-admin", responses((status = 200, description = "Stats and recent accounts")))]
pub async fn dashboard_data(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<DashboardData> {
    super_admin(&ctx)?;
    ok("Dashboard data retrieved", super_admin::dashboard_data(&state.db).await?)
}

// admins

#[utoipa::path(get, path = "/api/super-admin/admins", tag = "super-admin", params(PageQuery), responses((status = 200, description = "Admins")))]
pub async fn list_admins(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<AdminFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<AdminView>> {
    super_admin(&ctx)?;
    ok("Admins retrieved", super_admin::list_admins(&state.db, filter, page.pagination()).await?)
}

#[utoipa::path(post, path = "/api/super-admin/admins", tag = "super-admin", request_body = crate::openapi::ManagedAccountRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Email or username taken")))]
pub async fn create_admin(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<ManagedAccountInput>) -> Created<AdminView> {
    let actor = super_admin(&ctx)?;
    created("Admin created successfully", super_admin::create_admin(&state.db, &actor, input).await?)
}

#[utoipa::path(get, path = "/api/super-admin/admins/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Admin id")),
    responses((status = 200, description = "Admin"), (status = 404, description = "Not found")))]
pub async fn get_admin(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AdminView> {
    super_admin(&ctx)?;
    ok("Admin retrieved", super_admin::get_admin(&state.db, id).await?)
}

#[utoipa::path(put, path = "/api/super-admin/admins/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Admin id")),
    request_body = crate::openapi::ProfileRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_admin(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AdminPatch>,
) -> ApiResult<AdminView> {
    super_admin(&ctx)?;
    ok("Admin updated successfully", super_admin::update_admin(&state.db, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/super-admin/admins/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Admin id")),
    responses((status = 200, description = "Archived"), (status = 404, description = "Not found"), (status = 409, description = "Still owns active barbershops")))]
pub async fn delete_admin(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let actor = super_admin(&ctx)?;
    super_admin::delete_admin(&state.db, &actor, id).await?;
    done("Admin deleted successfully")
}

#[utoipa::path(post, path = "/api/super-admin/admins/{id}/toggle-status", tag = "super-admin", params(("id" = Uuid, Path, description = "Admin id")),
    responses((status = 200, description = "Toggled"), (status = 404, description = "Not found")))]
pub async fn toggle_admin(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AdminView> {
    super_admin(&ctx)?;
    let admin = super_admin::toggle_admin(&state.db, id).await?;
    let message = if admin.user.user.is_active { "Admin activated" } else { "Admin deactivated" };
    ok(message, admin)
}

#[utoipa::path(post, path = "/api/super-admin/admins/{id}/transfer-ownership", tag = "super-admin", params(("id" = Uuid, Path, description = "Source admin id")),
    request_body = crate::openapi::TransferOwnershipRequest,
    responses((status = 200, description = "Transferred"), (status = 400, description = "Same or inactive target"), (status = 404, description = "Not found")))]
pub async fn transfer_ownership(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<TransferOwnershipInput>,
) -> ApiResult<TransferResult> {
    super_admin(&ctx)?;
    let result = super_admin::transfer_ownership(&state.db, id, input.to_admin_id).await?;
    ok(&format!("{} barbershop(s) transferred", result.transferred), result)
}

#[utoipa::path(get, path = "/api/super-admin/admins/{id}/barbershops", tag = "super-admin", params(("id" = Uuid, Path, description = "Admin id")),
    responses((status = 200, description = "The admin's barbershops"), (status = 404, description = "Not found")))]
pub async fn admin_barbershops(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Vec<BarbershopView>> {
    super_admin(&ctx)?;
    ok("Barbershops retrieved", super_admin::admin_barbershops(&state.db, id).await?)
}

// barbershops

#[utoipa::path(get, path = "/api/super-admin/barbershops", tag = "super-admin", params(PageQuery), responses((status = 200, description = "Barbershops")))]
pub async fn list_barbershops(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<BarbershopFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<BarbershopView>> {
    let actor = operator(&ctx)?;
    ok("Barbershops retrieved", barbershops::list(&state.db, Scope::for_actor(&actor), filter, page.pagination()).await?)
}

#[utoipa::path(post, path = "/api/super-admin/barbershops", tag = "super-admin", request_body = crate::openapi::BarbershopRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Email or username taken")))]
pub async fn create_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<BarbershopCreate>) -> Created<BarbershopView> {
    let actor = operator(&ctx)?;
    created("Barbershop created successfully", barbershops::create(&state.db, &actor, input).await?)
}

#[utoipa::path(get, path = "/api/super-admin/barbershops/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Barbershop"), (status = 404, description = "Not found")))]
pub async fn get_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<BarbershopView> {
    let actor = operator(&ctx)?;
    ok("Barbershop retrieved", barbershops::get(&state.db, Scope::for_actor(&actor), id).await?)
}

#[utoipa::path(put, path = "/api/super-admin/barbershops/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    request_body = crate::openapi::BarbershopPatchRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update_barbershop(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<BarbershopPatch>,
) -> ApiResult<BarbershopView> {
    let actor = operator(&ctx)?;
    ok("Barbershop updated successfully", barbershops::update(&state.db, &actor, id, patch).await?)
}

#[utoipa::path(delete, path = "/api/super-admin/barbershops/{id}", tag = "super-admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Archived"), (status = 404, description = "Not found"), (status = 409, description = "Subscription still active")))]
pub async fn delete_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ApiMessage>, JsonApiError> {
    let actor = operator(&ctx)?;
    super_admin::delete_barbershop(&state.db, &actor, id).await?;
    done("Barbershop deleted successfully")
}

#[utoipa::path(post, path = "/api/super-admin/barbershops/{id}/toggle-status", tag = "super-admin", params(("id" = Uuid, Path, description = "Barbershop id")),
    responses((status = 200, description = "Toggled"), (status = 404, description = "Not found")))]
pub async fn toggle_barbershop(State(state): State<ServerState>, ctx: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult<BarbershopView> {
    let actor = operator(&ctx)?;
    let shop = barbershops::toggle(&state.db, Scope::for_actor(&actor), id).await?;
    let message = if shop.is_active { "Barbershop activated" } else { "Barbershop deactivated" };
    ok(message, barbershops::view(&state.db, shop).await?)
}

// archive

#[utoipa::path(get, path = "/api/super-admin/archive/admins", tag = "super-admin", responses((status = 200, description = "Archived admins")))]
pub async fn archived_admins(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<UserView>> {
    super_admin(&ctx)?;
    ok("Archived admins retrieved", super_admin::archived_admins(&state.db).await?)
}

#[utoipa::path(get, path = "/api/super-admin/archive/barbershops", tag = "super-admin", responses((status = 200, description = "Archived barbershops")))]
pub async fn archived_barbershops(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<Vec<UserView>> {
    super_admin(&ctx)?;
    ok("Archived barbershops retrieved", super_admin::archived_barbershops(&state.db).await?)
}

#[utoipa::path(post, path = "/api/super-admin/archive/restore", tag = "super-admin", request_body = crate::openapi::RestoreRequest,
    responses((status = 200, description = "Restored"), (status = 404, description = "No such archived user")))]
pub async fn restore(State(state): State<ServerState>, ctx: AuthContext, ApiJson(input): ApiJson<RestoreInput>) -> ApiResult<UserView> {
    super_admin(&ctx)?;
    ok("User restored successfully", super_admin::restore(&state.db, input).await?)
}
