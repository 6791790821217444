//! Caller profile and the admin-facing user directory.

use chrono::{NaiveDate, Utc};
use models::enums::Role;
use models::{user, user_credentials, validate};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, ALGORITHM};
use crate::errors::{ServiceError, ServiceResult};
use crate::pagination::{fetch_page, Page, Pagination};
use crate::query::{icontains, term};

/// Authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    pub full_name: String,
}

impl From<user::Model> for UserView {
    fn from(user: user::Model) -> Self {
        Self { full_name: user.full_name(), user }
    }
}

/// Editable profile fields; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub shop_name: Option<String>,
    pub shop_owner_name: Option<String>,
}

fn blank_to_none(v: String) -> Option<String> {
    let t = v.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

pub async fn find_user(db: &DatabaseConnection, id: Uuid) -> ServiceResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| ServiceError::not_found("user"))
}

pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<UserView> {
    Ok(find_user(db, user_id).await?.into())
}

/// Apply a profile patch and recompute `is_profile_complete`.
pub async fn apply_profile_patch<C: ConnectionTrait>(db: &C, current: user::Model, patch: ProfilePatch) -> ServiceResult<user::Model> {
    let mut first = current.first_name.clone();
    let mut last = current.last_name.clone();
    let mut phone = current.phone.clone();
    let id = current.id;
    let mut am: user::ActiveModel = current.into();

    if let Some(username) = patch.username {
        let username = username.trim().to_string();
        validate::validate_username(&username)?;
        if user::username_taken(db, &username, Some(id)).await? {
            return Err(ServiceError::conflict("a user with this username already exists"));
        }
        am.username = Set(username);
    }
    if let Some(v) = patch.first_name {
        validate::max_len("first_name", &v, 150)?;
        first = v.trim().to_string();
        am.first_name = Set(first.clone());
    }
    if let Some(v) = patch.last_name {
        validate::max_len("last_name", &v, 150)?;
        last = v.trim().to_string();
        am.last_name = Set(last.clone());
    }
    if let Some(v) = patch.phone {
        let v = blank_to_none(v);
        if let Some(p) = &v {
            validate::validate_phone(p)?;
        }
        phone = v.clone();
        am.phone = Set(v);
    }
    if let Some(v) = patch.date_of_birth {
        am.date_of_birth = Set(Some(v));
    }
    if let Some(v) = patch.address {
        am.address = Set(blank_to_none(v));
    }
    if let Some(v) = patch.city {
        am.city = Set(blank_to_none(v));
    }
    if let Some(v) = patch.state {
        am.state = Set(blank_to_none(v));
    }
    if let Some(v) = patch.country {
        am.country = Set(blank_to_none(v));
    }
    if let Some(v) = patch.postal_code {
        am.postal_code = Set(blank_to_none(v));
    }
    if let Some(v) = patch.shop_name {
        am.shop_name = Set(blank_to_none(v));
    }
    if let Some(v) = patch.shop_owner_name {
        am.shop_owner_name = Set(blank_to_none(v));
    }
    am.is_profile_complete = Set(user::profile_complete(&first, &last, phone.as_deref()));
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn update_profile(db: &DatabaseConnection, user_id: Uuid, patch: ProfilePatch) -> ServiceResult<UserView> {
    let current = find_user(db, user_id).await?;
    let updated = apply_profile_patch(db, current, patch).await?;
    info!(user_id = %user_id, "profile_updated");
    Ok(updated.into())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub search: Option<String>,
}

/// Non-deleted users, newest first.
pub async fn list_users(db: &DatabaseConnection, filter: UserFilter, page: Pagination) -> ServiceResult<Page<UserView>> {
    let mut q = user::Entity::find().filter(user::Column::DeletedAt.is_null());
    if let Some(role) = filter.role {
        q = q.filter(user::Column::Role.eq(role.as_str()));
    }
    if let Some(s) = term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(icontains::<user::Entity>(user::Column::Email, s))
                .add(icontains::<user::Entity>(user::Column::Username, s))
                .add(icontains::<user::Entity>(user::Column::FirstName, s))
                .add(icontains::<user::Entity>(user::Column::LastName, s)),
        );
    }
    let page = fetch_page(db, q.order_by_desc(user::Column::CreatedAt), page, 100).await?;
    Ok(page.map(UserView::from))
}

/// Login details for an account an operator creates on someone else's behalf.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagedAccountInput {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

/// Shop identity carried by barbershop accounts.
#[derive(Debug, Clone)]
pub struct ShopIdentity {
    pub shop_name: String,
    pub shop_owner_name: String,
}

/// Create a verified, active account owned by `created_by`, with its password.
pub async fn create_managed_account<C: ConnectionTrait>(
    db: &C,
    input: &ManagedAccountInput,
    role: Role,
    created_by: Uuid,
    shop: Option<ShopIdentity>,
) -> ServiceResult<user::Model> {
    validate::password_pair(&input.password, &input.password_confirm)?;
    let email = validate::normalize_email(&input.email)?;
    if user::find_by_email(db, &email).await?.is_some() {
        return Err(ServiceError::conflict("a user with this email already exists"));
    }
    let username = input.username.trim().to_string();
    validate::validate_username(&username)?;
    if user::username_taken(db, &username, None).await? {
        return Err(ServiceError::conflict("a user with this username already exists"));
    }
    let mut new_user = user::NewUser::new(&email, &username, role);
    new_user.first_name = input.first_name.trim().to_string();
    new_user.last_name = input.last_name.trim().to_string();
    new_user.phone = input.phone.clone();
    new_user.created_by = Some(created_by);
    new_user.is_email_verified = true;
    if let Some(shop) = shop {
        validate::required("shop_name", &shop.shop_name)?;
        validate::required("shop_owner_name", &shop.shop_owner_name)?;
        new_user.shop_name = Some(shop.shop_name.trim().to_string());
        new_user.shop_owner_name = Some(shop.shop_owner_name.trim().to_string());
    }
    let created = user::create(db, new_user).await?;
    user_credentials::set_password(db, created.id, hash_password(&input.password)?, ALGORITHM).await?;
    info!(user_id = %created.id, role = %role, created_by = %created_by, "managed_account_created");
    Ok(created)
}

/// The platform operator account created at install time.
#[derive(Debug, Clone)]
pub struct SuperAdminSeed {
    pub email: String,
    pub password: String,
    /// Defaults to the local part of the email.
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// Create the super admin, or promote the account already registered under
/// that email and reset its password. Returns the account and whether it
/// was newly created.
pub async fn ensure_super_admin(db: &DatabaseConnection, seed: SuperAdminSeed) -> ServiceResult<(user::Model, bool)> {
    validate::password_pair(&seed.password, &seed.password)?;
    let email = validate::normalize_email(&seed.email)?;
    let hash = hash_password(&seed.password)?;
    let txn = db.begin().await?;

    let (account, created) = match user::find_by_email(&txn, &email).await? {
        Some(existing) => {
            let mut am: user::ActiveModel = existing.into();
            am.role = Set(Role::SuperAdmin.as_str().to_string());
            am.is_active = Set(true);
            am.is_email_verified = Set(true);
            am.deleted_at = Set(None);
            am.deleted_by = Set(None);
            am.updated_at = Set(Utc::now().into());
            (am.update(&txn).await?, false)
        }
        None => {
            let username = seed
                .username
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| {
                    let local = email.split('@').next().unwrap_or_default();
                    local.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
                });
            if user::username_taken(&txn, &username, None).await? {
                return Err(ServiceError::conflict("a user with this username already exists"));
            }
            let mut new_user = user::NewUser::new(&email, &username, Role::SuperAdmin);
            new_user.first_name = seed.first_name.trim().to_string();
            new_user.last_name = seed.last_name.trim().to_string();
            new_user.is_email_verified = true;
            (user::create(&txn, new_user).await?, true)
        }
    };
    user_credentials::set_password(&txn, account.id, hash, ALGORITHM).await?;
    txn.commit().await?;
    info!(user_id = %account.id, created, "super_admin_ensured");
    Ok((account, created))
}

pub async fn set_active<C: ConnectionTrait>(db: &C, current: user::Model, active: bool) -> ServiceResult<user::Model> {
    let mut am: user::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn profile_update_recomputes_completeness() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
        let u = user::create(&db, user::NewUser::new(&format!("p_{tag}@example.com"), &format!("p_{tag}"), Role::Customer)).await?;
        assert!(!u.is_profile_complete);

        let patch = ProfilePatch {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            phone: Some("+919812345678".into()),
            ..Default::default()
        };
        let view = update_profile(&db, u.id, patch).await?;
        assert!(view.user.is_profile_complete);
        assert_eq!(view.full_name, "Asha Rao");

        let bad = update_profile(&db, u.id, ProfilePatch { phone: Some("12ab".into()), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Model(_))));

        let listed = list_users(&db, UserFilter { role: None, search: Some(format!("P_{tag}")) }, Pagination::default()).await?;
        assert_eq!(listed.total, 1);
        user::hard_delete(&db, u.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn super_admin_is_created_then_promoted() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
        let seed = |email: String| SuperAdminSeed {
            email,
            password: "R00tPassw0rd".into(),
            username: None,
            first_name: "Platform".into(),
            last_name: "Owner".into(),
        };

        let (root, created) = ensure_super_admin(&db, seed(format!("Root_{tag}@Example.com"))).await?;
        assert!(created);
        assert_eq!(root.role, "super_admin");
        assert_eq!(root.username, format!("root_{tag}"));
        assert!(root.is_email_verified);
        assert!(user_credentials::find_for_user(&db, root.id).await?.is_some());

        let (again, created) = ensure_super_admin(&db, seed(format!("root_{tag}@example.com"))).await?;
        assert!(!created);
        assert_eq!(again.id, root.id);

        let mut existing = user::NewUser::new(&format!("promote_{tag}@example.com"), &format!("promote_{tag}"), Role::Customer);
        existing.first_name = "Later".into();
        let customer = user::create(&db, existing).await?;
        user::soft_delete(&db, customer.id, None).await?;
        let (promoted, created) = ensure_super_admin(&db, seed(format!("promote_{tag}@example.com"))).await?;
        assert!(!created);
        assert_eq!(promoted.id, customer.id);
        assert_eq!(promoted.role, "super_admin");
        assert!(promoted.is_active && promoted.deleted_at.is_none());
        Ok(())
    }
}
