//! Barbershop subscriptions and their change history.

use chrono::Utc;
use models::enums::{SubscriptionPlan, SubscriptionStatus};
use models::subscription::{self, SubscriptionView};
use models::subscription_history::{self, Change};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ServiceError, ServiceResult};

/// Open the subscription for a new barbershop and record it.
pub async fn open<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, plan: SubscriptionPlan, changed_by: Uuid) -> ServiceResult<subscription::Model> {
    let created = subscription::create(db, barbershop_id, plan).await?;
    subscription_history::append(
        db,
        created.id,
        Change {
            action: "created".into(),
            new_plan: Some(created.plan.clone()),
            new_status: Some(created.status.clone()),
            changed_by: Some(changed_by),
            notes: "Subscription created with barbershop".into(),
            ..Default::default()
        },
    )
    .await?;
    Ok(created)
}

/// History action for a change, or `None` when nothing changes.
pub fn change_action(plan_changed: bool, status_changed: bool) -> Option<&'static str> {
    match (plan_changed, status_changed) {
        (true, true) => Some("plan_and_status_changed"),
        (true, false) => Some("plan_changed"),
        (false, true) => Some("status_changed"),
        (false, false) => None,
    }
}

/// Apply a plan and/or status change, appending one history row when anything differs.
pub async fn change<C: ConnectionTrait>(
    db: &C,
    barbershop_id: Uuid,
    plan: Option<SubscriptionPlan>,
    status: Option<SubscriptionStatus>,
    changed_by: Uuid,
) -> ServiceResult<Option<subscription::Model>> {
    if plan.is_none() && status.is_none() {
        return Ok(subscription::find_for_barbershop(db, barbershop_id).await?);
    }
    let current = subscription::find_for_barbershop(db, barbershop_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("subscription"))?;
    let new_plan = plan.map(|p| p.as_str().to_string()).unwrap_or_else(|| current.plan.clone());
    let new_status = status.map(|s| s.as_str().to_string()).unwrap_or_else(|| current.status.clone());
    let Some(action) = change_action(new_plan != current.plan, new_status != current.status) else {
        return Ok(Some(current));
    };
    let change = Change {
        action: action.into(),
        old_plan: Some(current.plan.clone()),
        new_plan: Some(new_plan.clone()),
        old_status: Some(current.status.clone()),
        new_status: Some(new_status.clone()),
        changed_by: Some(changed_by),
        notes: String::new(),
    };
    let mut am: subscription::ActiveModel = current.into();
    if let Some(p) = plan {
        am.features = Set(subscription::default_features(p));
    }
    am.plan = Set(new_plan);
    am.status = Set(new_status);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    subscription_history::append(db, updated.id, change).await?;
    info!(barbershop_id = %barbershop_id, action, "subscription_changed");
    Ok(Some(updated))
}

pub async fn view_for<C: ConnectionTrait>(db: &C, barbershop_id: Uuid) -> ServiceResult<Option<SubscriptionView>> {
    Ok(subscription::find_for_barbershop(db, barbershop_id).await?.map(subscription::Model::view))
}

pub async fn history<C: ConnectionTrait>(db: &C, barbershop_id: Uuid) -> ServiceResult<Vec<subscription_history::Model>> {
    match subscription::find_for_barbershop(db, barbershop_id).await? {
        Some(s) => Ok(subscription_history::list_for(db, s.id).await?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop, seed_user};
    use models::enums::Role;

    #[test]
    fn action_names_describe_what_moved() {
        assert_eq!(change_action(true, false), Some("plan_changed"));
        assert_eq!(change_action(false, true), Some("status_changed"));
        assert_eq!(change_action(true, true), Some("plan_and_status_changed"));
        assert_eq!(change_action(false, false), None);
    }

    #[tokio::test]
    async fn each_change_appends_history() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let admin = seed_user(&db, Role::Admin).await?;
        let shop = seed_barbershop(&db).await?;

        let opened = open(&db, shop.id, SubscriptionPlan::Basic, admin.id).await?;
        assert_eq!(opened.status, "active");
        change(&db, shop.id, Some(SubscriptionPlan::Premium), None, admin.id).await?;
        change(&db, shop.id, Some(SubscriptionPlan::Premium), None, admin.id).await?;
        let suspended = change(&db, shop.id, None, Some(SubscriptionStatus::Suspended), admin.id).await?;
        assert_eq!(suspended.map(|s| s.status), Some("suspended".to_string()));

        let rows = history(&db, shop.id).await?;
        let actions: Vec<&str> = rows.iter().map(|h| h.action.as_str()).collect();
        assert_eq!(actions, vec!["status_changed", "plan_changed", "created"]);
        Ok(())
    }
}
