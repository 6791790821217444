use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::ActionType;
use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub action_type: String,
    pub description: String,
    pub appointment_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub metadata: Json,
    pub created_at: DateTimeWithTimeZone,
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

/// Builder for one activity entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub barbershop_id: Uuid,
    pub action: ActionType,
    pub description: String,
    pub appointment_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

impl NewActivity {
    pub fn new(barbershop_id: Uuid, action: ActionType, description: impl Into<String>) -> Self {
        Self {
            barbershop_id,
            action,
            description: description.into(),
            appointment_id: None,
            sale_id: None,
            customer_id: None,
            staff_id: None,
            inventory_id: None,
            metadata: serde_json::json!({}),
        }
    }

    pub fn appointment(mut self, id: Uuid) -> Self {
        self.appointment_id = Some(id);
        self
    }

    pub fn sale(mut self, id: Uuid) -> Self {
        self.sale_id = Some(id);
        self
    }

    pub fn customer(mut self, id: Uuid) -> Self {
        self.customer_id = Some(id);
        self
    }

    pub fn staff(mut self, id: Uuid) -> Self {
        self.staff_id = Some(id);
        self
    }

    pub fn inventory(mut self, id: Uuid) -> Self {
        self.inventory_id = Some(id);
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

pub async fn record<C: ConnectionTrait>(db: &C, entry: NewActivity) -> Result<Model, ModelError> {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(entry.barbershop_id),
        action_type: Set(entry.action.as_str().to_string()),
        description: Set(entry.description),
        appointment_id: Set(entry.appointment_id),
        sale_id: Set(entry.sale_id),
        customer_id: Set(entry.customer_id),
        staff_id: Set(entry.staff_id),
        inventory_id: Set(entry.inventory_id),
        metadata: Set(entry.metadata),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)
}
