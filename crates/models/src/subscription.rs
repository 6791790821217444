use chrono::{DateTime, Duration, Utc};
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{SubscriptionPlan, SubscriptionStatus};
use crate::errors::ModelError;
use crate::user;

pub const DEFAULT_TERM_DAYS: i64 = 365;
pub const DEFAULT_MAX_APPOINTMENTS: i32 = 100;
pub const DEFAULT_MAX_STAFF: i32 = 5;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub barbershop_id: Uuid,
    pub plan: String,
    pub status: String,
    pub starts_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub max_appointments: i32,
    pub max_staff: i32,
    pub features: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Barbershop }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Barbershop => Entity::belongs_to(user::Entity)
                .from(Column::BarbershopId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Barbershop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole days left before expiry, never negative.
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        let left = self.expires_at.with_timezone(&Utc) - now;
        left.num_days().max(0)
    }

    pub fn days_remaining(&self) -> i64 {
        self.days_remaining_at(Utc::now())
    }

    /// Active status and not yet expired.
    pub fn is_in_force(&self) -> bool {
        self.status == SubscriptionStatus::Active.as_str() && !self.is_expired()
    }

    pub fn view(self) -> SubscriptionView {
        SubscriptionView {
            is_expired: self.is_expired(),
            days_remaining: self.days_remaining(),
            subscription: self,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Model,
    pub is_expired: bool,
    pub days_remaining: i64,
}

/// Default feature flags per plan.
pub fn default_features(plan: SubscriptionPlan) -> serde_json::Value {
    match plan {
        SubscriptionPlan::Basic => serde_json::json!({ "reports": false, "analytics": false, "export": false }),
        SubscriptionPlan::Premium => serde_json::json!({ "reports": true, "analytics": true, "export": false }),
        SubscriptionPlan::Enterprise => serde_json::json!({ "reports": true, "analytics": true, "export": true }),
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, plan: SubscriptionPlan) -> Result<Model, ModelError> {
    let now = Utc::now();
    ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        plan: Set(plan.as_str().to_string()),
        status: Set(SubscriptionStatus::Active.as_str().to_string()),
        starts_at: Set(now.into()),
        expires_at: Set((now + Duration::days(DEFAULT_TERM_DAYS)).into()),
        max_appointments: Set(DEFAULT_MAX_APPOINTMENTS),
        max_staff: Set(DEFAULT_MAX_STAFF),
        features: Set(default_features(plan)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)
}

pub async fn find_for_barbershop<C: ConnectionTrait>(db: &C, barbershop_id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await
        .map_err(ModelError::db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expires_in_days: i64, status: SubscriptionStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            plan: "basic".into(),
            status: status.as_str().into(),
            starts_at: now.into(),
            expires_at: (now + Duration::days(expires_in_days) + Duration::minutes(1)).into(),
            max_appointments: DEFAULT_MAX_APPOINTMENTS,
            max_staff: DEFAULT_MAX_STAFF,
            features: default_features(SubscriptionPlan::Basic),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let s = sample(30, SubscriptionStatus::Active);
        assert_eq!(s.days_remaining(), 30);
        assert!(!s.is_expired());
        assert!(s.is_in_force());
    }

    #[test]
    fn expired_subscription_reports_zero_days() {
        let s = sample(-3, SubscriptionStatus::Active);
        assert!(s.is_expired());
        assert_eq!(s.days_remaining(), 0);
        assert!(!s.is_in_force());
    }

    #[test]
    fn suspended_is_not_in_force() {
        let s = sample(10, SubscriptionStatus::Suspended);
        assert!(!s.is_in_force());
    }

    #[test]
    fn enterprise_unlocks_export() {
        assert_eq!(default_features(SubscriptionPlan::Enterprise)["export"], true);
        assert_eq!(default_features(SubscriptionPlan::Basic)["reports"], false);
    }
}
