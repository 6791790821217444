use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::AppointmentStatus;
use crate::errors::ModelError;
use crate::user;

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub barber_name: String,
    pub appointment_date: Date,
    pub appointment_time: Time,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: String,
    pub amount: f64,
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
    pub fn is_today(&self) -> bool {
        self.appointment_date == Local::now().date_naive()
    }

    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed.as_str()
    }

    pub fn status(&self) -> Result<AppointmentStatus, ModelError> {
        self.status.parse()
    }

    /// Whether this booking blocks the schedule.
    pub fn occupies_slot(&self) -> bool {
        self.status().map(|s| s.occupies_slot()).unwrap_or(false)
    }

    /// Half-open interval in minutes since midnight.
    pub fn interval(&self) -> (u32, u32) {
        interval(self.appointment_time, self.duration_minutes)
    }

    pub fn view(self) -> AppointmentView {
        AppointmentView { is_today: self.is_today(), is_completed: self.is_completed(), appointment: self }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Model,
    pub is_today: bool,
    pub is_completed: bool,
}

pub fn interval(start: NaiveTime, duration_minutes: i32) -> (u32, u32) {
    let from = start.hour() * 60 + start.minute();
    (from, from + duration_minutes.max(0) as u32)
}

/// `[a, a+da)` and `[b, b+db)` share at least one minute.
pub fn overlaps(a: (u32, u32), b: (u32, u32)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Slot-holding bookings for a barbershop on a date, optionally narrowed to one barber.
pub async fn occupying<C: ConnectionTrait>(
    db: &C,
    barbershop_id: Uuid,
    date: NaiveDate,
    barber_name: Option<&str>,
) -> Result<Vec<Model>, ModelError> {
    let mut q = Entity::find()
        .filter(Column::BarbershopId.eq(barbershop_id))
        .filter(Column::AppointmentDate.eq(date))
        .filter(Column::Status.is_in([
            AppointmentStatus::Confirmed.as_str(),
            AppointmentStatus::Pending.as_str(),
        ]));
    if let Some(barber) = barber_name {
        q = q.filter(Column::BarberName.eq(barber));
    }
    q.order_by_asc(Column::AppointmentTime).all(db).await.map_err(ModelError::db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn back_to_back_bookings_do_not_overlap() {
        let first = interval(t(10, 0), 60);
        let second = interval(t(11, 0), 30);
        assert!(!overlaps(first, second));
        assert!(!overlaps(second, first));
    }

    #[test]
    fn partial_overlap_is_detected() {
        assert!(overlaps(interval(t(10, 0), 60), interval(t(10, 30), 30)));
        assert!(overlaps(interval(t(9, 45), 30), interval(t(10, 0), 60)));
        assert!(overlaps(interval(t(10, 0), 120), interval(t(10, 30), 15)));
    }

    #[test]
    fn interval_is_minutes_since_midnight() {
        assert_eq!(interval(t(9, 30), 45), (570, 615));
    }
}
