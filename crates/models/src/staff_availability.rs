use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::staff;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_availability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub staff_id: Uuid,
    pub date: Date,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub is_available: bool,
    pub notes: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Staff }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Staff => Entity::belongs_to(staff::Entity)
                .from(Column::StaffId)
                .to(staff::Column::Id)
                .into(),
        }
    }
}

impl Related<staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// End must follow start when both bounds are present.
pub fn window_is_valid(start: Option<Time>, end: Option<Time>) -> bool {
    match (start, end) {
        (Some(s), Some(e)) => e > s,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn window_requires_end_after_start() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        let five = NaiveTime::from_hms_opt(17, 0, 0);
        assert!(window_is_valid(nine, five));
        assert!(!window_is_valid(five, nine));
        assert!(!window_is_valid(nine, nine));
        assert!(window_is_valid(nine, None));
        assert!(window_is_valid(None, None));
    }
}
