use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::StaffRole;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
    pub schedule: String,
    pub status: String,
    pub salary: Option<f64>,
    pub join_date: Date,
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
    pub fn is_barber(&self) -> bool {
        self.role.parse::<StaffRole>().map(|r| r.is_barber()).unwrap_or(false)
    }

    pub fn view(self) -> StaffView {
        StaffView { is_barber: self.is_barber(), staff: self }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffView {
    #[serde(flatten)]
    pub staff: Model,
    pub is_barber: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn member(role: &str) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            name: "Ravi".into(),
            role: role.into(),
            phone: "+919876543210".into(),
            email: String::new(),
            schedule: String::new(),
            status: "Active".into(),
            salary: None,
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn senior_barber_counts_as_barber() {
        assert!(member("Senior Barber").is_barber());
        assert!(member("Barber").is_barber());
        assert!(!member("Receptionist").is_barber());
    }
}
