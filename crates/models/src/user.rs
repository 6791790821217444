use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::Role;
use crate::errors::ModelError;
use crate::validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub role: String,
    pub shop_name: Option<String>,
    pub shop_owner_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub is_profile_complete: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Creator,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Creator => Entity::belongs_to(Entity).from(Column::CreatedBy).to(Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// "First Last", or the email when both names are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name).trim().to_string();
        if name.is_empty() { self.email.clone() } else { name }
    }

    pub fn role(&self) -> Result<Role, ModelError> {
        self.role.parse()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role.as_str()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Active and not archived.
    pub fn can_sign_in(&self) -> bool {
        self.is_active && !self.is_deleted()
    }

    /// Display name for a barbershop: shop name, else the owner's name.
    pub fn shop_label(&self) -> String {
        self.shop_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.full_name())
    }
}

/// Whether a profile carries the fields required to be considered complete.
pub fn profile_complete(first_name: &str, last_name: &str, phone: Option<&str>) -> bool {
    !first_name.trim().is_empty()
        && !last_name.trim().is_empty()
        && phone.map(|p| !p.trim().is_empty()).unwrap_or(false)
}

/// Input for inserting a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub shop_name: Option<String>,
    pub shop_owner_name: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_email_verified: bool,
}

impl NewUser {
    pub fn new(email: &str, username: &str, role: Role) -> Self {
        Self {
            email: email.to_string(),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            role,
            shop_name: None,
            shop_owner_name: None,
            created_by: None,
            is_email_verified: false,
        }
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, ModelError> {
    let email = validate::normalize_email(&input.email)?;
    validate::validate_username(&input.username)?;
    validate::max_len("first_name", &input.first_name, 150)?;
    validate::max_len("last_name", &input.last_name, 150)?;
    let phone = input.phone.filter(|p| !p.trim().is_empty());
    if let Some(p) = &phone {
        validate::validate_phone(p)?;
    }
    let complete = profile_complete(&input.first_name, &input.last_name, phone.as_deref());
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        username: Set(input.username),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        phone: Set(phone),
        date_of_birth: Set(None),
        role: Set(input.role.as_str().to_string()),
        shop_name: Set(input.shop_name),
        shop_owner_name: Set(input.shop_owner_name),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        country: Set(None),
        postal_code: Set(None),
        is_email_verified: Set(input.is_email_verified),
        is_phone_verified: Set(false),
        is_profile_complete: Set(complete),
        is_active: Set(true),
        created_by: Set(input.created_by),
        last_login_at: Set(None),
        last_login_ip: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    };
    am.insert(db).await.map_err(ModelError::db)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(ModelError::db)
}

pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str, except: Option<Uuid>) -> Result<bool, ModelError> {
    let mut q = Entity::find().filter(Column::Username.eq(username));
    if let Some(id) = except {
        q = q.filter(Column::Id.ne(id));
    }
    Ok(q.one(db).await.map_err(ModelError::db)?.is_some())
}

/// Archive a user: stamp deletion metadata and deactivate.
pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: Uuid, deleted_by: Option<Uuid>) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ModelError::db)?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    let now = Utc::now();
    found.deleted_at = Set(Some(now.into()));
    found.deleted_by = Set(deleted_by);
    found.is_active = Set(false);
    found.updated_at = Set(now.into());
    found.update(db).await.map_err(ModelError::db)
}

/// Undo [`soft_delete`].
pub async fn restore<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ModelError::db)?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    found.deleted_at = Set(None);
    found.deleted_by = Set(None);
    found.is_active = Set(true);
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(ModelError::db)
}

pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    Entity::delete_by_id(id).exec(db).await.map_err(ModelError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        let now = Utc::now().into();
        Model {
            id: Uuid::new_v4(),
            email: "owner@shop.com".into(),
            username: "owner".into(),
            first_name: "".into(),
            last_name: "".into(),
            phone: None,
            date_of_birth: None,
            role: "barbershop".into(),
            shop_name: Some("Fade Factory".into()),
            shop_owner_name: Some("Ravi".into()),
            address: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            is_email_verified: true,
            is_phone_verified: false,
            is_profile_complete: false,
            is_active: true,
            created_by: None,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn full_name_falls_back_to_email() {
        let mut u = sample();
        assert_eq!(u.full_name(), "owner@shop.com");
        u.first_name = "Ravi".into();
        assert_eq!(u.full_name(), "Ravi");
        u.last_name = "Kumar".into();
        assert_eq!(u.full_name(), "Ravi Kumar");
    }

    #[test]
    fn role_and_sign_in_flags() {
        let mut u = sample();
        assert_eq!(u.role().unwrap(), Role::Barbershop);
        assert!(u.has_role(Role::Barbershop));
        assert!(u.can_sign_in());
        u.deleted_at = Some(Utc::now().into());
        assert!(!u.can_sign_in());
    }

    #[test]
    fn profile_completeness() {
        assert!(profile_complete("A", "B", Some("+911234567890")));
        assert!(!profile_complete("A", "", Some("+911234567890")));
        assert!(!profile_complete("A", "B", None));
    }

    #[test]
    fn shop_label_prefers_shop_name() {
        let mut u = sample();
        assert_eq!(u.shop_label(), "Fade Factory");
        u.shop_name = Some("  ".into());
        assert_eq!(u.shop_label(), "owner@shop.com");
    }
}
