//! Admin console, scoped to the barbershops the admin created.

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use models::activity_log::{self, NewActivity};
use models::appointment::{self, AppointmentView};
use models::enums::{ActionType, AppointmentStatus, Role};
use models::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::accounts::{Actor, UserView};
use crate::activity;
use crate::appointments::{self, AppointmentInput, AppointmentPatch};
use crate::barbershops::{self, Scope};
use crate::errors::{ServiceError, ServiceResult};
use crate::pagination::{fetch_page, Page, Pagination};
use crate::stats;

pub const ACTIVITY_PAGE_SIZE: u32 = 50;
pub const ACTIVITY_MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_ANALYTICS_DAYS: i64 = 30;

/// Ids of the live barbershops this admin created.
pub async fn owned_ids(db: &DatabaseConnection, admin_id: Uuid) -> ServiceResult<Vec<Uuid>> {
    Ok(user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .filter(user::Column::Role.eq(Role::Barbershop.as_str()))
        .filter(user::Column::CreatedBy.eq(admin_id))
        .filter(user::Column::DeletedAt.is_null())
        .into_tuple()
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_barbershops: u64,
    pub active_barbershops: u64,
    pub total_appointments: u64,
    pub monthly_revenue: f64,
}

pub async fn stats(db: &DatabaseConnection, admin_id: Uuid) -> ServiceResult<AdminStats> {
    let shops = owned_ids(db, admin_id).await?;
    let active_barbershops = user::Entity::find()
        .filter(user::Column::Id.is_in(shops.clone()))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let in_shops = appointment::Entity::find().filter(appointment::Column::BarbershopId.is_in(shops.clone()));
    let month_amounts: Vec<f64> = in_shops
        .clone()
        .select_only()
        .column(appointment::Column::Amount)
        .filter(appointment::Column::Status.eq(AppointmentStatus::Completed.as_str()))
        .filter(appointment::Column::AppointmentDate.gte(stats::first_of_month(Local::now().date_naive())))
        .into_tuple()
        .all(db)
        .await?;
    Ok(AdminStats {
        total_barbershops: shops.len() as u64,
        active_barbershops,
        total_appointments: in_shops.count(db).await?,
        monthly_revenue: stats::sum(month_amounts),
    })
}

/// Activity entry with the owning shop's display name.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: activity_log::Model,
    pub barbershop_name: String,
}

fn activity_views(rows: Vec<(activity_log::Model, Option<user::Model>)>) -> Vec<ActivityView> {
    rows.into_iter()
        .map(|(a, shop)| ActivityView { activity: a, barbershop_name: shop.map(|s| s.shop_label()).unwrap_or_default() })
        .collect()
}

async fn recent_activities(db: &DatabaseConnection, shops: Vec<Uuid>, limit: u64) -> ServiceResult<Vec<ActivityView>> {
    let rows = activity_log::Entity::find()
        .find_also_related(user::Entity)
        .filter(activity_log::Column::BarbershopId.is_in(shops))
        .order_by_desc(activity_log::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;
    Ok(activity_views(rows))
}

#[derive(Debug, Clone, Serialize)]
pub struct BarbershopSummary {
    pub id: Uuid,
    pub shop_name: String,
    pub owner: String,
    pub email: String,
    pub is_active: bool,
    pub appointments: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: AdminStats,
    pub recent_activities: Vec<ActivityView>,
    pub recent_appointments: Vec<AppointmentView>,
    pub barbershop_summary: Vec<BarbershopSummary>,
}

pub async fn dashboard_data(db: &DatabaseConnection, admin_id: Uuid) -> ServiceResult<DashboardData> {
    let shops = owned_ids(db, admin_id).await?;
    let recent_appointments = appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.is_in(shops.clone()))
        .order_by_desc(appointment::Column::CreatedAt)
        .limit(10)
        .all(db)
        .await?;
    let newest = user::Entity::find()
        .filter(user::Column::Id.is_in(shops.clone()))
        .order_by_desc(user::Column::CreatedAt)
        .limit(5)
        .all(db)
        .await?;
    let mut barbershop_summary = Vec::with_capacity(newest.len());
    for shop in newest {
        let appointments = appointment::Entity::find()
            .filter(appointment::Column::BarbershopId.eq(shop.id))
            .count(db)
            .await?;
        barbershop_summary.push(BarbershopSummary {
            id: shop.id,
            shop_name: shop.shop_label(),
            owner: shop.shop_owner_name.clone().unwrap_or_else(|| shop.full_name()),
            email: shop.email,
            is_active: shop.is_active,
            appointments,
        });
    }
    Ok(DashboardData {
        stats: stats(db, admin_id).await?,
        recent_activities: recent_activities(db, shops, 10).await?,
        recent_appointments: recent_appointments.into_iter().map(appointment::Model::view).collect(),
        barbershop_summary,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminActivityFilter {
    pub action_type: Option<ActionType>,
    pub barbershop: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn day_start(d: NaiveDate) -> Option<chrono::DateTime<Utc>> {
    d.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
}

pub async fn activities(db: &DatabaseConnection, admin_id: Uuid, filter: AdminActivityFilter, page: Pagination) -> ServiceResult<Page<ActivityView>> {
    let shops = owned_ids(db, admin_id).await?;
    let mut q = activity_log::Entity::find().filter(activity_log::Column::BarbershopId.is_in(shops));
    if let Some(a) = filter.action_type {
        q = q.filter(activity_log::Column::ActionType.eq(a.as_str()));
    }
    if let Some(shop) = filter.barbershop {
        q = q.filter(activity_log::Column::BarbershopId.eq(shop));
    }
    if let Some(start) = filter.start_date.and_then(day_start) {
        q = q.filter(activity_log::Column::CreatedAt.gte(start));
    }
    if let Some(end) = filter.end_date.and_then(|d| day_start(d + Duration::days(1))) {
        q = q.filter(activity_log::Column::CreatedAt.lt(end));
    }
    let page = fetch_page(db, q.order_by_desc(activity_log::Column::CreatedAt), page, ACTIVITY_MAX_PAGE_SIZE).await?;
    let shop_ids: Vec<Uuid> = page.items.iter().map(|a| a.barbershop_id).collect();
    let names: std::collections::HashMap<Uuid, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(shop_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.shop_label()))
        .collect();
    Ok(page.map(|a| ActivityView { barbershop_name: names.get(&a.barbershop_id).cloned().unwrap_or_default(), activity: a }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminAppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub barbershop: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn list_appointments(
    db: &DatabaseConnection,
    admin_id: Uuid,
    filter: AdminAppointmentFilter,
    page: Pagination,
) -> ServiceResult<Page<AppointmentView>> {
    let shops = owned_ids(db, admin_id).await?;
    let mut q = appointment::Entity::find().filter(appointment::Column::BarbershopId.is_in(shops));
    if let Some(s) = filter.status {
        q = q.filter(appointment::Column::Status.eq(s.as_str()));
    }
    if let Some(shop) = filter.barbershop {
        q = q.filter(appointment::Column::BarbershopId.eq(shop));
    }
    if let Some(d) = filter.start_date {
        q = q.filter(appointment::Column::AppointmentDate.gte(d));
    }
    if let Some(d) = filter.end_date {
        q = q.filter(appointment::Column::AppointmentDate.lte(d));
    }
    let q = q
        .order_by_desc(appointment::Column::AppointmentDate)
        .order_by_desc(appointment::Column::AppointmentTime);
    Ok(fetch_page(db, q, page, 100).await?.map(appointment::Model::view))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAppointmentInput {
    pub barbershop_id: Uuid,
    #[serde(flatten)]
    pub appointment: AppointmentInput,
}

pub async fn create_appointment(db: &DatabaseConnection, admin_id: Uuid, input: AdminAppointmentInput) -> ServiceResult<AppointmentView> {
    if !owned_ids(db, admin_id).await?.contains(&input.barbershop_id) {
        return Err(ServiceError::validation("barbershop_id does not refer to one of your barbershops"));
    }
    appointments::create(db, input.barbershop_id, input.appointment).await
}

async fn find_scoped_appointment(db: &DatabaseConnection, admin_id: Uuid, id: Uuid) -> ServiceResult<appointment::Model> {
    let shops = owned_ids(db, admin_id).await?;
    appointment::Entity::find_by_id(id)
        .filter(appointment::Column::BarbershopId.is_in(shops))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("appointment"))
}

pub async fn get_appointment(db: &DatabaseConnection, admin_id: Uuid, id: Uuid) -> ServiceResult<AppointmentView> {
    Ok(find_scoped_appointment(db, admin_id, id).await?.view())
}

pub async fn update_appointment(db: &DatabaseConnection, admin_id: Uuid, id: Uuid, patch: AppointmentPatch) -> ServiceResult<AppointmentView> {
    let found = find_scoped_appointment(db, admin_id, id).await?;
    appointments::update(db, found.barbershop_id, found.id, patch).await
}

pub async fn delete_appointment(db: &DatabaseConnection, admin_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_scoped_appointment(db, admin_id, id).await?;
    appointments::delete(db, found.barbershop_id, found.id).await
}

/// Soft delete and note it in the shop's activity log.
pub async fn delete_barbershop(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> ServiceResult<()> {
    let shop = barbershops::find_in_scope(db, Scope::OwnedBy(actor.user_id), id).await?;
    barbershops::archive(db, &shop, actor).await?;
    activity::log(
        db,
        NewActivity::new(shop.id, ActionType::ProfileUpdated, format!("Barbershop {} archived", shop.shop_label()))
            .metadata(json!({ "deleted_by": actor.user_id })),
    )
    .await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleResult {
    pub is_active: bool,
}

pub async fn toggle_barbershop(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> ServiceResult<ToggleResult> {
    let shop = barbershops::toggle(db, Scope::OwnedBy(actor.user_id), id).await?;
    let verb = if shop.is_active { "activated" } else { "deactivated" };
    activity::log(
        db,
        NewActivity::new(shop.id, ActionType::SettingsChanged, format!("Barbershop {} {}", shop.shop_label(), verb))
            .metadata(json!({ "is_active": shop.is_active, "changed_by": actor.user_id })),
    )
    .await?;
    Ok(ToggleResult { is_active: shop.is_active })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBreakdown {
    pub month: String,
    pub appointments: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarbershopAnalytics {
    pub barbershop: UserView,
    pub period_days: i64,
    pub total_appointments: u64,
    pub completed_appointments: u64,
    pub completion_rate: f64,
    pub total_revenue: f64,
    pub average_revenue_per_appointment: f64,
    pub monthly_breakdown: Vec<MonthBreakdown>,
    pub recent_activities: Vec<ActivityView>,
}

/// Per-month counts of all appointments and revenue from the completed ones, oldest month first.
pub fn month_breakdown(start: NaiveDate, end: NaiveDate, rows: &[appointment::Model]) -> Vec<MonthBreakdown> {
    let mut out = Vec::new();
    let mut month = stats::first_of_month(start);
    while month <= end {
        let key = stats::month_key(month);
        let in_month: Vec<&appointment::Model> = rows.iter().filter(|a| stats::month_key(a.appointment_date) == key).collect();
        out.push(MonthBreakdown {
            month: key,
            appointments: in_month.len() as u64,
            revenue: stats::sum(in_month.iter().filter(|a| a.is_completed()).map(|a| a.amount)),
        });
        month = stats::next_month(month.year(), month.month());
    }
    out
}

pub async fn analytics(db: &DatabaseConnection, admin_id: Uuid, id: Uuid, days: Option<i64>) -> ServiceResult<BarbershopAnalytics> {
    let shop = barbershops::find_in_scope(db, Scope::OwnedBy(admin_id), id).await?;
    let days = days.unwrap_or(DEFAULT_ANALYTICS_DAYS).clamp(1, 366);
    let today = Local::now().date_naive();
    let start = today - Duration::days(days);
    let rows = appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.eq(shop.id))
        .filter(appointment::Column::AppointmentDate.gte(start))
        .all(db)
        .await?;
    let completed: Vec<&appointment::Model> = rows.iter().filter(|a| a.is_completed()).collect();
    let total_revenue = stats::sum(completed.iter().map(|a| a.amount));
    Ok(BarbershopAnalytics {
        period_days: days,
        total_appointments: rows.len() as u64,
        completed_appointments: completed.len() as u64,
        completion_rate: stats::rate(completed.len() as u64, rows.len() as u64),
        total_revenue,
        average_revenue_per_appointment: stats::average(total_revenue, completed.len() as u64),
        monthly_breakdown: month_breakdown(start, today, &rows),
        recent_activities: recent_activities(db, vec![shop.id], 10).await?,
        barbershop: shop.into(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferInput {
    pub barbershop_id: Uuid,
    pub to_admin_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub barbershop_id: Uuid,
    pub from_admin_id: Option<Uuid>,
    pub to_admin_id: Uuid,
}

async fn active_admin(db: &DatabaseConnection, id: Uuid) -> ServiceResult<user::Model> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(Role::Admin.as_str()))
        .filter(user::Column::IsActive.eq(true))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("target admin not found or inactive"))
}

/// Hand one barbershop to another admin. Admins may only move their own.
pub async fn transfer(db: &DatabaseConnection, actor: &Actor, input: TransferInput) -> ServiceResult<TransferOutcome> {
    if input.to_admin_id == actor.user_id {
        return Err(ServiceError::validation("cannot transfer a barbershop to yourself"));
    }
    let shop = barbershops::find_in_scope(db, Scope::for_actor(actor), input.barbershop_id).await?;
    let target = active_admin(db, input.to_admin_id).await?;
    let from = shop.created_by;
    let label = shop.shop_label();
    let mut am: user::ActiveModel = shop.into();
    am.created_by = Set(Some(target.id));
    am.updated_at = Set(Utc::now().into());
    let moved = am.update(db).await?;
    activity::log(
        db,
        NewActivity::new(moved.id, ActionType::SettingsChanged, format!("Barbershop {} transferred to {}", label, target.full_name()))
            .metadata(json!({ "from_admin_id": from, "to_admin_id": target.id, "transferred_by": actor.user_id })),
    )
    .await?;
    info!(barbershop_id = %moved.id, to = %target.id, "barbershop_transferred");
    Ok(TransferOutcome { barbershop_id: moved.id, from_admin_id: from, to_admin_id: target.id })
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOption {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub display_name: String,
}

pub async fn available_admins(db: &DatabaseConnection, actor: &Actor) -> ServiceResult<Vec<AdminOption>> {
    let rows = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Admin.as_str()))
        .filter(user::Column::IsActive.eq(true))
        .filter(user::Column::DeletedAt.is_null())
        .filter(user::Column::Id.ne(actor.user_id))
        .order_by_asc(user::Column::Email)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|u| {
            let name = u.full_name();
            AdminOption { id: u.id, display_name: format!("{} ({})", name, u.email), name, email: u.email }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::ManagedAccountInput;
    use crate::barbershops::BarbershopCreate;
    use crate::test_support::{get_db, seed_user};

    fn appt(date: NaiveDate, status: &str, amount: f64) -> appointment::Model {
        let now = Utc::now();
        appointment::Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::nil(),
            customer_name: "C".into(),
            customer_phone: String::new(),
            customer_email: None,
            service: "Cut".into(),
            barber_name: "Ravi".into(),
            appointment_date: date,
            appointment_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 60,
            status: status.into(),
            notes: String::new(),
            amount,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn breakdown_spans_every_month_in_range() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        let rows = vec![appt(d(1, 20), "completed", 200.0), appt(d(1, 21), "cancelled", 500.0), appt(d(3, 2), "completed", 100.0)];
        let out = month_breakdown(d(1, 15), d(3, 10), &rows);
        assert_eq!(out.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(), vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(out[0], MonthBreakdown { month: "2024-01".into(), appointments: 2, revenue: 200.0 });
        assert_eq!(out[1].appointments, 0);
    }

    #[tokio::test]
    async fn admin_cannot_reach_other_admins_shops() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let a = seed_user(&db, Role::Admin).await?;
        let b = seed_user(&db, Role::Admin).await?;
        let a_actor = Actor { user_id: a.id, role: Role::Admin };
        let b_actor = Actor { user_id: b.id, role: Role::Admin };
        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
        let shop = barbershops::create(
            &db,
            &a_actor,
            BarbershopCreate {
                account: ManagedAccountInput {
                    email: format!("s_{tag}@example.com"),
                    username: format!("s_{tag}"),
                    first_name: String::new(),
                    last_name: String::new(),
                    phone: None,
                    password: "Passw0rd!".into(),
                    password_confirm: "Passw0rd!".into(),
                },
                shop_name: "Fade Street".into(),
                shop_owner_name: "Kabir".into(),
                plan: None,
            },
        )
        .await?;
        let shop_id = shop.user.user.id;

        assert!(matches!(toggle_barbershop(&db, &b_actor, shop_id).await, Err(ServiceError::NotFound(_))));
        assert!(!toggle_barbershop(&db, &a_actor, shop_id).await?.is_active);
        assert_eq!(stats(&db, a.id).await?.total_barbershops, 1);
        assert_eq!(stats(&db, b.id).await?.total_barbershops, 0);

        let options = available_admins(&db, &a_actor).await?;
        assert!(options.iter().all(|o| o.id != a.id));
        assert!(matches!(
            transfer(&db, &b_actor, TransferInput { barbershop_id: shop_id, to_admin_id: a.id }).await,
            Err(ServiceError::NotFound(_))
        ));
        let moved = transfer(&db, &a_actor, TransferInput { barbershop_id: shop_id, to_admin_id: b.id }).await?;
        assert_eq!(moved.from_admin_id, Some(a.id));
        assert_eq!(stats(&db, b.id).await?.total_barbershops, 1);

        let logs = activities(&db, b.id, AdminActivityFilter::default(), Pagination::new(None, Some(ACTIVITY_PAGE_SIZE))).await?;
        assert!(logs.items.iter().any(|l| l.activity.action_type == ActionType::SettingsChanged.as_str()));
        Ok(())
    }
}
