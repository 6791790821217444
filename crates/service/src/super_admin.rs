//! Platform operator: admins, every barbershop and the archive.

use chrono::{Datelike, Local, NaiveDate};
use models::enums::Role;
use models::user;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::accounts::{self, Actor, ManagedAccountInput, ProfilePatch, UserView};
use crate::barbershops::{self, BarbershopView, Scope};
use crate::errors::{ServiceError, ServiceResult};
use crate::pagination::{fetch_page, Page, Pagination};
use crate::query::{icontains, term};
use crate::stats;

pub const RECENT_LIMIT: u64 = 5;

fn live(role: Role) -> sea_orm::Select<user::Entity> {
    user::Entity::find()
        .filter(user::Column::Role.eq(role.as_str()))
        .filter(user::Column::DeletedAt.is_null())
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_admins: u64,
    pub total_barbershops: u64,
    pub active_barbershops: u64,
    pub monthly_growth: f64,
}

/// Barbershops created within `[start, end)`.
async fn barbershops_created_between(db: &DatabaseConnection, start: NaiveDate, end: NaiveDate) -> ServiceResult<u64> {
    let (Some(s), Some(e)) = (start.and_hms_opt(0, 0, 0), end.and_hms_opt(0, 0, 0)) else {
        return Ok(0);
    };
    Ok(live(Role::Barbershop)
        .filter(user::Column::CreatedAt.gte(s.and_utc()))
        .filter(user::Column::CreatedAt.lt(e.and_utc()))
        .count(db)
        .await?)
}

pub async fn stats(db: &DatabaseConnection) -> ServiceResult<DashboardStats> {
    let today = Local::now().date_naive();
    let this_month = stats::first_of_month(today);
    let last_month = stats::trailing_months(today, 2)
        .first()
        .and_then(|&(y, m)| stats::month_start(y, m))
        .unwrap_or(this_month);
    let current = barbershops_created_between(db, this_month, stats::next_month(today.year(), today.month())).await?;
    let previous = barbershops_created_between(db, last_month, this_month).await?;
    Ok(DashboardStats {
        total_admins: live(Role::Admin).count(db).await?,
        total_barbershops: live(Role::Barbershop).count(db).await?,
        active_barbershops: live(Role::Barbershop).filter(user::Column::IsActive.eq(true)).count(db).await?,
        monthly_growth: stats::percent_change(current, previous),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_admins: Vec<UserView>,
    pub recent_barbershops: Vec<UserView>,
}

async fn recent(db: &DatabaseConnection, role: Role) -> ServiceResult<Vec<UserView>> {
    let rows = live(role).order_by_desc(user::Column::CreatedAt).limit(RECENT_LIMIT).all(db).await?;
    Ok(rows.into_iter().map(UserView::from).collect())
}

pub async fn dashboard_data(db: &DatabaseConnection) -> ServiceResult<DashboardData> {
    Ok(DashboardData {
        stats: stats(db).await?,
        recent_admins: recent(db, Role::Admin).await?,
        recent_barbershops: recent(db, Role::Barbershop).await?,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    #[serde(flatten)]
    pub user: UserView,
    pub barbershop_count: u64,
}

async fn admin_view(db: &DatabaseConnection, admin: user::Model) -> ServiceResult<AdminView> {
    let barbershop_count = live(Role::Barbershop).filter(user::Column::CreatedBy.eq(admin.id)).count(db).await?;
    Ok(AdminView { user: admin.into(), barbershop_count })
}

pub async fn list_admins(db: &DatabaseConnection, filter: AdminFilter, page: Pagination) -> ServiceResult<Page<AdminView>> {
    let mut q = live(Role::Admin);
    if let Some(s) = term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(icontains::<user::Entity>(user::Column::Email, s))
                .add(icontains::<user::Entity>(user::Column::Username, s))
                .add(icontains::<user::Entity>(user::Column::FirstName, s))
                .add(icontains::<user::Entity>(user::Column::LastName, s)),
        );
    }
    if let Some(active) = filter.is_active {
        q = q.filter(user::Column::IsActive.eq(active));
    }
    let page = fetch_page(db, q.order_by_desc(user::Column::CreatedAt), page, 100).await?;
    let mut items = Vec::with_capacity(page.items.len());
    for admin in page.items.iter().cloned() {
        items.push(admin_view(db, admin).await?);
    }
    Ok(Page { items, total: page.total, page: page.page, per_page: page.per_page, total_pages: page.total_pages })
}

pub async fn create_admin(db: &DatabaseConnection, actor: &Actor, input: ManagedAccountInput) -> ServiceResult<AdminView> {
    let created = accounts::create_managed_account(db, &input, Role::Admin, actor.user_id, None).await?;
    admin_view(db, created).await
}

pub async fn find_admin(db: &DatabaseConnection, id: Uuid) -> ServiceResult<user::Model> {
    live(Role::Admin)
        .filter(user::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("admin"))
}

pub async fn get_admin(db: &DatabaseConnection, id: Uuid) -> ServiceResult<AdminView> {
    let admin = find_admin(db, id).await?;
    admin_view(db, admin).await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPatch {
    #[serde(flatten)]
    pub profile: ProfilePatch,
    pub is_active: Option<bool>,
}

pub async fn update_admin(db: &DatabaseConnection, id: Uuid, patch: AdminPatch) -> ServiceResult<AdminView> {
    let current = find_admin(db, id).await?;
    let txn = db.begin().await?;
    let mut admin = accounts::apply_profile_patch(&txn, current, patch.profile).await?;
    if let Some(active) = patch.is_active {
        admin = accounts::set_active(&txn, admin, active).await?;
    }
    txn.commit().await?;
    admin_view(db, admin).await
}

/// Soft delete, refused while the admin still owns live, active barbershops.
pub async fn delete_admin(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> ServiceResult<()> {
    let admin = find_admin(db, id).await?;
    let owned_active = live(Role::Barbershop)
        .filter(user::Column::CreatedBy.eq(admin.id))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;
    if owned_active > 0 {
        warn!(admin_id = %id, owned_active, "admin_delete_refused");
        return Err(ServiceError::conflict(format!(
            "cannot delete admin with {owned_active} active barbershops; transfer or deactivate them first"
        )));
    }
    user::soft_delete(db, admin.id, Some(actor.user_id)).await?;
    info!(admin_id = %id, deleted_by = %actor.user_id, "admin_archived");
    Ok(())
}

pub async fn toggle_admin(db: &DatabaseConnection, id: Uuid) -> ServiceResult<AdminView> {
    let admin = find_admin(db, id).await?;
    let next = !admin.is_active;
    let updated = accounts::set_active(db, admin, next).await?;
    admin_view(db, updated).await
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TransferResult {
    pub transferred: u64,
    pub from_admin_id: Uuid,
    pub to_admin_id: Uuid,
}

/// Move every barbershop of one admin to another active admin.
pub async fn transfer_ownership(db: &DatabaseConnection, from: Uuid, to: Uuid) -> ServiceResult<TransferResult> {
    if from == to {
        return Err(ServiceError::validation("cannot transfer barbershops to the same admin"));
    }
    let source = find_admin(db, from).await?;
    let target = find_admin(db, to).await?;
    if !target.is_active {
        return Err(ServiceError::validation("target admin is not active"));
    }
    let res = user::Entity::update_many()
        .col_expr(user::Column::CreatedBy, Expr::value(target.id))
        .filter(user::Column::Role.eq(Role::Barbershop.as_str()))
        .filter(user::Column::CreatedBy.eq(source.id))
        .exec(db)
        .await?;
    info!(from = %from, to = %to, count = res.rows_affected, "barbershops_transferred");
    Ok(TransferResult { transferred: res.rows_affected, from_admin_id: from, to_admin_id: to })
}

pub async fn admin_barbershops(db: &DatabaseConnection, id: Uuid) -> ServiceResult<Vec<BarbershopView>> {
    let admin = find_admin(db, id).await?;
    let rows = live(Role::Barbershop)
        .filter(user::Column::CreatedBy.eq(admin.id))
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?;
    let mut out = Vec::with_capacity(rows.len());
    for shop in rows {
        out.push(barbershops::view(db, shop).await?);
    }
    Ok(out)
}

/// Soft delete, refused while the subscription is active and unexpired.
pub async fn delete_barbershop(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> ServiceResult<()> {
    let shop = barbershops::find_in_scope(db, Scope::for_actor(actor), id).await?;
    if let Some(sub) = models::subscription::find_for_barbershop(db, shop.id).await? {
        if sub.is_in_force() {
            return Err(ServiceError::conflict(
                "cannot delete a barbershop with an active subscription; suspend or let it expire first",
            ));
        }
    }
    barbershops::archive(db, &shop, actor).await?;
    Ok(())
}

async fn archived(db: &DatabaseConnection, role: Role) -> ServiceResult<Vec<UserView>> {
    let rows = user::Entity::find()
        .filter(user::Column::Role.eq(role.as_str()))
        .filter(user::Column::DeletedAt.is_not_null())
        .order_by_desc(user::Column::DeletedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(UserView::from).collect())
}

pub async fn archived_admins(db: &DatabaseConnection) -> ServiceResult<Vec<UserView>> {
    archived(db, Role::Admin).await
}

pub async fn archived_barbershops(db: &DatabaseConnection) -> ServiceResult<Vec<UserView>> {
    archived(db, Role::Barbershop).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchivedKind {
    Admin,
    Barbershop,
}

impl ArchivedKind {
    fn role(self) -> Role {
        match self {
            ArchivedKind::Admin => Role::Admin,
            ArchivedKind::Barbershop => Role::Barbershop,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestoreInput {
    pub user_id: Uuid,
    pub user_type: ArchivedKind,
}

pub async fn restore(db: &DatabaseConnection, input: RestoreInput) -> ServiceResult<UserView> {
    let found = user::Entity::find_by_id(input.user_id)
        .filter(user::Column::Role.eq(input.user_type.role().as_str()))
        .filter(user::Column::DeletedAt.is_not_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("archived user"))?;
    let restored = user::restore(db, found.id).await?;
    info!(user_id = %restored.id, role = %restored.role, "user_restored");
    Ok(restored.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barbershops::BarbershopCreate;
    use crate::test_support::{get_db, seed_user};
    use models::enums::{SubscriptionPlan, SubscriptionStatus};

    fn account(prefix: &str) -> ManagedAccountInput {
        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
        ManagedAccountInput {
            email: format!("{prefix}_{tag}@example.com"),
            username: format!("{prefix}_{tag}"),
            first_name: "Meera".into(),
            last_name: "Iyer".into(),
            phone: None,
            password: "Adm1nPassw0rd".into(),
            password_confirm: "Adm1nPassw0rd".into(),
        }
    }

    #[tokio::test]
    async fn admin_with_active_shops_cannot_be_deleted_until_transfer() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let root = seed_user(&db, Role::SuperAdmin).await?;
        let root_actor = Actor { user_id: root.id, role: Role::SuperAdmin };

        let a = create_admin(&db, &root_actor, account("adm")).await?;
        let b = create_admin(&db, &root_actor, account("adm")).await?;
        let a_id = a.user.user.id;
        let b_id = b.user.user.id;
        assert_eq!(a.user.user.created_by, Some(root.id));

        let a_actor = Actor { user_id: a_id, role: Role::Admin };
        let shop = barbershops::create(
            &db,
            &a_actor,
            BarbershopCreate { account: account("shop"), shop_name: "Cuts".into(), shop_owner_name: "Meera".into(), plan: None },
        )
        .await?;
        let shop_id = shop.user.user.id;

        assert!(matches!(delete_admin(&db, &root_actor, a_id).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(transfer_ownership(&db, a_id, a_id).await, Err(ServiceError::Validation(_))));
        let moved = transfer_ownership(&db, a_id, b_id).await?;
        assert_eq!(moved.transferred, 1);
        assert_eq!(admin_barbershops(&db, b_id).await?.len(), 1);

        delete_admin(&db, &root_actor, a_id).await?;
        assert!(archived_admins(&db).await?.iter().any(|u| u.user.id == a_id));
        restore(&db, RestoreInput { user_id: a_id, user_type: ArchivedKind::Admin }).await?;
        assert!(get_admin(&db, a_id).await?.user.user.is_active);

        assert!(matches!(delete_barbershop(&db, &root_actor, shop_id).await, Err(ServiceError::Conflict(_))));
        crate::subscriptions::change(&db, shop_id, Some(SubscriptionPlan::Basic), Some(SubscriptionStatus::Suspended), root.id).await?;
        delete_barbershop(&db, &root_actor, shop_id).await?;
        assert!(archived_barbershops(&db).await?.iter().any(|u| u.user.id == shop_id));
        Ok(())
    }
}
