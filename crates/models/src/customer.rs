use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub total_visits: i32,
    pub last_visit_date: Option<Date>,
    pub total_spent: f64,
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
    /// More than one recorded visit.
    pub fn is_returning(&self) -> bool {
        self.total_visits > 1
    }
}
