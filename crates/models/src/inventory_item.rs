use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::StockStatus;
use crate::user;
use crate::validate::round_money;

pub const DEFAULT_MIN_STOCK: i32 = 5;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub min_stock: i32,
    pub unit_cost: f64,
    pub selling_price: f64,
    pub supplier: String,
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
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    pub fn stock_status(&self) -> StockStatus {
        if self.quantity == 0 {
            StockStatus::OutOfStock
        } else if self.is_low_stock() {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    fn has_pricing(&self) -> bool {
        self.unit_cost > 0.0 && self.selling_price > 0.0
    }

    /// Markup over cost as a percentage, 0 when either price is unset.
    pub fn profit_margin(&self) -> f64 {
        if !self.has_pricing() {
            return 0.0;
        }
        round_money((self.selling_price - self.unit_cost) / self.unit_cost * 100.0)
    }

    pub fn profit_per_unit(&self) -> f64 {
        if !self.has_pricing() {
            return 0.0;
        }
        round_money(self.selling_price - self.unit_cost)
    }

    pub fn view(self) -> InventoryView {
        InventoryView {
            is_low_stock: self.is_low_stock(),
            stock_status: self.stock_status(),
            profit_margin: self.profit_margin(),
            profit_per_unit: self.profit_per_unit(),
            item: self,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    #[serde(flatten)]
    pub item: Model,
    pub is_low_stock: bool,
    pub stock_status: StockStatus,
    pub profit_margin: f64,
    pub profit_per_unit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(quantity: i32, cost: f64, price: f64) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            name: "Pomade".into(),
            category: "Hair Products".into(),
            quantity,
            min_stock: DEFAULT_MIN_STOCK,
            unit_cost: cost,
            selling_price: price,
            supplier: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(item(0, 1.0, 2.0).stock_status(), StockStatus::OutOfStock);
        assert_eq!(item(5, 1.0, 2.0).stock_status(), StockStatus::LowStock);
        assert_eq!(item(6, 1.0, 2.0).stock_status(), StockStatus::InStock);
        assert!(item(0, 1.0, 2.0).is_low_stock());
    }

    #[test]
    fn margin_needs_both_prices() {
        assert_eq!(item(10, 0.0, 50.0).profit_margin(), 0.0);
        assert_eq!(item(10, 0.0, 50.0).profit_per_unit(), 0.0);
        assert_eq!(item(10, 30.0, 45.0).profit_margin(), 50.0);
        assert_eq!(item(10, 3.0, 4.0).profit_margin(), 33.33);
        assert_eq!(item(10, 30.0, 45.5).profit_per_unit(), 15.5);
    }

    #[test]
    fn view_serializes_computed_fields() {
        let v = serde_json::to_value(item(2, 10.0, 15.0).view()).unwrap();
        assert_eq!(v["stock_status"], "low_stock");
        assert_eq!(v["is_low_stock"], true);
        assert_eq!(v["name"], "Pomade");
    }
}
