//! Barbershop accounts as managed by admins and the super admin.

use models::enums::{Role, SubscriptionPlan, SubscriptionStatus};
use models::subscription::{self, SubscriptionView};
use models::user;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::accounts::{self, Actor, ManagedAccountInput, ProfilePatch, ShopIdentity, UserView};
use crate::errors::{ServiceError, ServiceResult};
use crate::pagination::{fetch_page, Page, Pagination};
use crate::query::{icontains, term};
use crate::subscriptions;

/// Which barbershops a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(Uuid),
}

impl Scope {
    pub fn for_actor(actor: &Actor) -> Self {
        if actor.is_super_admin() { Scope::All } else { Scope::OwnedBy(actor.user_id) }
    }

    fn apply(self, q: Select<user::Entity>) -> Select<user::Entity> {
        let q = q.filter(user::Column::Role.eq(Role::Barbershop.as_str()));
        match self {
            Scope::All => q,
            Scope::OwnedBy(owner) => q.filter(user::Column::CreatedBy.eq(owner)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BarbershopView {
    #[serde(flatten)]
    pub user: UserView,
    pub subscription: Option<SubscriptionView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarbershopCreate {
    #[serde(flatten)]
    pub account: ManagedAccountInput,
    pub shop_name: String,
    pub shop_owner_name: String,
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarbershopPatch {
    #[serde(flatten)]
    pub profile: ProfilePatch,
    pub is_active: Option<bool>,
    pub plan: Option<SubscriptionPlan>,
    pub subscription_status: Option<SubscriptionStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarbershopFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub plan: Option<SubscriptionPlan>,
}

pub async fn view(db: &DatabaseConnection, shop: user::Model) -> ServiceResult<BarbershopView> {
    let subscription = subscriptions::view_for(db, shop.id).await?;
    Ok(BarbershopView { user: shop.into(), subscription })
}

/// Live barbershop within `scope`, else 404.
pub async fn find_in_scope(db: &DatabaseConnection, scope: Scope, id: Uuid) -> ServiceResult<user::Model> {
    scope
        .apply(user::Entity::find_by_id(id))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("barbershop"))
}

pub async fn list(db: &DatabaseConnection, scope: Scope, filter: BarbershopFilter, page: Pagination) -> ServiceResult<Page<BarbershopView>> {
    let mut q = scope.apply(user::Entity::find()).filter(user::Column::DeletedAt.is_null());
    if let Some(s) = term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(icontains::<user::Entity>(user::Column::ShopName, s))
                .add(icontains::<user::Entity>(user::Column::ShopOwnerName, s))
                .add(icontains::<user::Entity>(user::Column::Email, s)),
        );
    }
    if let Some(active) = filter.is_active {
        q = q.filter(user::Column::IsActive.eq(active));
    }
    if let Some(plan) = filter.plan {
        q = q.filter(
            user::Column::Id.in_subquery(
                Query::select()
                    .column(subscription::Column::BarbershopId)
                    .from(subscription::Entity)
                    .and_where(subscription::Column::Plan.eq(plan.as_str()))
                    .to_owned(),
            ),
        );
    }
    let page = fetch_page(db, q.order_by_desc(user::Column::CreatedAt), page, 100).await?;
    let mut items = Vec::with_capacity(page.items.len());
    for shop in page.items.iter().cloned() {
        items.push(view(db, shop).await?);
    }
    Ok(Page { items, total: page.total, page: page.page, per_page: page.per_page, total_pages: page.total_pages })
}

/// New barbershop owned by the caller, with credentials and a subscription.
pub async fn create(db: &DatabaseConnection, actor: &Actor, input: BarbershopCreate) -> ServiceResult<BarbershopView> {
    let txn = db.begin().await?;
    let shop = accounts::create_managed_account(
        &txn,
        &input.account,
        Role::Barbershop,
        actor.user_id,
        Some(ShopIdentity { shop_name: input.shop_name, shop_owner_name: input.shop_owner_name }),
    )
    .await?;
    subscriptions::open(&txn, shop.id, input.plan.unwrap_or(SubscriptionPlan::Basic), actor.user_id).await?;
    txn.commit().await?;
    info!(barbershop_id = %shop.id, created_by = %actor.user_id, "barbershop_created");
    view(db, shop).await
}

pub async fn get(db: &DatabaseConnection, scope: Scope, id: Uuid) -> ServiceResult<BarbershopView> {
    let shop = find_in_scope(db, scope, id).await?;
    view(db, shop).await
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, patch: BarbershopPatch) -> ServiceResult<BarbershopView> {
    let current = find_in_scope(db, Scope::for_actor(actor), id).await?;
    let txn = db.begin().await?;
    let mut shop = accounts::apply_profile_patch(&txn, current, patch.profile).await?;
    if let Some(active) = patch.is_active {
        shop = accounts::set_active(&txn, shop, active).await?;
    }
    subscriptions::change(&txn, shop.id, patch.plan, patch.subscription_status, actor.user_id).await?;
    txn.commit().await?;
    view(db, shop).await
}

/// Flip `is_active`, returning the new value.
pub async fn toggle(db: &DatabaseConnection, scope: Scope, id: Uuid) -> ServiceResult<user::Model> {
    let current = find_in_scope(db, scope, id).await?;
    let next = !current.is_active;
    accounts::set_active(db, current, next).await
}

pub async fn archive(db: &DatabaseConnection, shop: &user::Model, actor: &Actor) -> ServiceResult<user::Model> {
    let archived = user::soft_delete(db, shop.id, Some(actor.user_id)).await?;
    info!(barbershop_id = %shop.id, deleted_by = %actor.user_id, "barbershop_archived");
    Ok(archived)
}

/// Soft-deleted barbershops in scope, most recently deleted first.
pub async fn archived(db: &DatabaseConnection, scope: Scope) -> ServiceResult<Vec<UserView>> {
    let rows = scope
        .apply(user::Entity::find())
        .filter(user::Column::DeletedAt.is_not_null())
        .order_by_desc(user::Column::DeletedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(UserView::from).collect())
}

pub async fn restore(db: &DatabaseConnection, scope: Scope, id: Uuid) -> ServiceResult<UserView> {
    let found = scope
        .apply(user::Entity::find_by_id(id))
        .filter(user::Column::DeletedAt.is_not_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("archived barbershop"))?;
    let restored = user::restore(db, found.id).await?;
    info!(barbershop_id = %id, "barbershop_restored");
    Ok(restored.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};

    fn shop_input(tag: &str) -> BarbershopCreate {
        BarbershopCreate {
            account: ManagedAccountInput {
                email: format!("Shop_{tag}@Example.com"),
                username: format!("shop_{tag}"),
                first_name: "Ravi".into(),
                last_name: "Kumar".into(),
                phone: None,
                password: "Sup3rSecret".into(),
                password_confirm: "Sup3rSecret".into(),
            },
            shop_name: "Sharp Cuts".into(),
            shop_owner_name: "Ravi Kumar".into(),
            plan: Some(SubscriptionPlan::Premium),
        }
    }

    #[tokio::test]
    async fn admin_scope_hides_foreign_shops() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let owner = seed_user(&db, Role::Admin).await?;
        let stranger = seed_user(&db, Role::Admin).await?;
        let owner_actor = Actor { user_id: owner.id, role: Role::Admin };
        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();

        let created = create(&db, &owner_actor, shop_input(&tag)).await?;
        assert_eq!(created.user.user.email, format!("shop_{tag}@example.com"));
        assert!(created.user.user.is_email_verified);
        assert_eq!(created.subscription.as_ref().map(|s| s.subscription.plan.as_str()), Some("premium"));
        assert!(matches!(create(&db, &owner_actor, shop_input(&tag)).await, Err(ServiceError::Conflict(_))));

        let id = created.user.user.id;
        assert!(get(&db, Scope::OwnedBy(owner.id), id).await.is_ok());
        assert!(matches!(get(&db, Scope::OwnedBy(stranger.id), id).await, Err(ServiceError::NotFound(_))));
        assert!(get(&db, Scope::All, id).await.is_ok());

        let toggled = toggle(&db, Scope::OwnedBy(owner.id), id).await?;
        assert!(!toggled.is_active);

        let shop = find_in_scope(&db, Scope::All, id).await?;
        archive(&db, &shop, &owner_actor).await?;
        assert!(get(&db, Scope::All, id).await.is_err());
        assert_eq!(archived(&db, Scope::OwnedBy(owner.id)).await?.len(), 1);
        let restored = restore(&db, Scope::OwnedBy(owner.id), id).await?;
        assert!(restored.user.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn failed_subscription_change_rolls_back_profile_edit() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let root = seed_user(&db, Role::SuperAdmin).await?;
        let actor = Actor { user_id: root.id, role: Role::SuperAdmin };
        // seeded without a subscription, so the plan change fails after the profile write
        let shop = seed_user(&db, Role::Barbershop).await?;
        let before = shop.shop_name.clone();

        let patch = BarbershopPatch {
            profile: ProfilePatch { shop_name: Some("Renamed".into()), ..Default::default() },
            is_active: Some(false),
            plan: Some(SubscriptionPlan::Enterprise),
            subscription_status: None,
        };
        assert!(matches!(update(&db, &actor, shop.id, patch).await, Err(ServiceError::NotFound(_))));

        let reloaded = find_in_scope(&db, Scope::All, shop.id).await?;
        assert_eq!(reloaded.shop_name, before);
        assert!(reloaded.is_active);
        Ok(())
    }
}
