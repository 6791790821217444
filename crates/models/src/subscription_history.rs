use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::subscription;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub action: String,
    pub old_plan: Option<String>,
    pub new_plan: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub changed_by: Option<Uuid>,
    pub notes: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Subscription }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Subscription => Entity::belongs_to(subscription::Entity)
                .from(Column::SubscriptionId)
                .to(subscription::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One entry describing a change between two subscription states.
#[derive(Debug, Clone, Default)]
pub struct Change {
    pub action: String,
    pub old_plan: Option<String>,
    pub new_plan: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub changed_by: Option<Uuid>,
    pub notes: String,
}

pub async fn append<C: ConnectionTrait>(db: &C, subscription_id: Uuid, change: Change) -> Result<Model, ModelError> {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        subscription_id: Set(subscription_id),
        action: Set(change.action),
        old_plan: Set(change.old_plan),
        new_plan: Set(change.new_plan),
        old_status: Set(change.old_status),
        new_status: Set(change.new_status),
        changed_by: Set(change.changed_by),
        notes: Set(change.notes),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)
}

pub async fn list_for<C: ConnectionTrait>(db: &C, subscription_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::SubscriptionId.eq(subscription_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(ModelError::db)
}
