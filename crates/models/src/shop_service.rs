use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shop_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub is_active: bool,
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
    pub fn formatted_price(&self) -> String {
        format!("₹{:.2}", self.price)
    }

    pub fn view(self) -> ShopServiceView {
        ShopServiceView { formatted_price: self.formatted_price(), service: self }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopServiceView {
    #[serde(flatten)]
    pub service: Model,
    pub formatted_price: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn price_is_rupee_formatted() {
        let now = Utc::now();
        let s = Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            name: "Fade".into(),
            price: 250.0,
            description: None,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        };
        assert_eq!(s.formatted_price(), "₹250.00");
    }
}
