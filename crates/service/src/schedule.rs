//! Calendar, day grid, free slots and blocked time.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use models::activity_log::NewActivity;
use models::appointment;
use models::enums::{ActionType, AppointmentStatus};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::activity;
use crate::appointments::{self, AppointmentInput};
use crate::errors::{ServiceError, ServiceResult};
use crate::staff;
use crate::stats::{self, SlotAvailability};
use crate::time_fmt::{hhmm, parse_date, parse_time};

pub const BLOCKED_CUSTOMER: &str = "BLOCKED";

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub customer_name: String,
    pub service: String,
    pub time: String,
    pub status: String,
    pub barber: String,
}

/// Month bounds, validating the month number.
fn month_range(year: i32, month: u32) -> ServiceResult<(NaiveDate, NaiveDate)> {
    let start = stats::month_start(year, month).ok_or_else(|| ServiceError::validation("month must be between 1 and 12"))?;
    Ok((start, stats::next_month(year, month) - Duration::days(1)))
}

/// The month's appointments keyed by `YYYY-MM-DD`.
pub async fn calendar(
    db: &DatabaseConnection,
    barbershop_id: Uuid,
    month: Option<u32>,
    year: Option<i32>,
) -> ServiceResult<BTreeMap<String, Vec<CalendarEntry>>> {
    let today = Local::now().date_naive();
    let (start, end) = month_range(year.unwrap_or(today.year()), month.unwrap_or(today.month()))?;
    let rows = appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .filter(appointment::Column::AppointmentDate.between(start, end))
        .order_by_asc(appointment::Column::AppointmentDate)
        .order_by_asc(appointment::Column::AppointmentTime)
        .all(db)
        .await?;
    let mut out: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();
    for a in rows {
        out.entry(a.appointment_date.format("%Y-%m-%d").to_string()).or_default().push(CalendarEntry {
            id: a.id,
            customer_name: a.customer_name,
            service: a.service,
            time: hhmm(a.appointment_time),
            status: a.status,
            barber: a.barber_name,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize)]
pub struct GridStaff {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridAppointment {
    pub id: Uuid,
    pub time: String,
    pub customer: String,
    pub service: String,
    pub barber: String,
    pub status: String,
    pub duration: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleGrid {
    pub date: NaiveDate,
    pub staff: Vec<GridStaff>,
    pub time_slots: Vec<String>,
    pub appointments: Vec<GridAppointment>,
}

pub async fn grid(db: &DatabaseConnection, barbershop_id: Uuid, date: Option<NaiveDate>) -> ServiceResult<ScheduleGrid> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let rows = appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .filter(appointment::Column::AppointmentDate.eq(date))
        .order_by_asc(appointment::Column::AppointmentTime)
        .all(db)
        .await?;
    let members = staff::active_members(db, barbershop_id).await?;
    Ok(ScheduleGrid {
        date,
        staff: members.into_iter().map(|s| GridStaff { name: s.name, role: s.role }).collect(),
        time_slots: stats::time_slots().into_iter().map(hhmm).collect(),
        appointments: rows
            .into_iter()
            .map(|a| GridAppointment {
                id: a.id,
                time: hhmm(a.appointment_time),
                customer: a.customer_name,
                service: a.service,
                barber: a.barber_name,
                status: a.status,
                duration: a.duration_minutes,
            })
            .collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub barber: Option<String>,
    pub time_slots: Vec<SlotAvailability>,
}

/// `date` arrives raw from the query string; it is required.
pub async fn available_slots(
    db: &DatabaseConnection,
    barbershop_id: Uuid,
    date: Option<&str>,
    barber: Option<String>,
) -> ServiceResult<AvailableSlots> {
    let raw = date.filter(|d| !d.trim().is_empty()).ok_or_else(|| ServiceError::validation("date parameter is required"))?;
    let date = parse_date("date", raw)?;
    let barber = barber.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
    let booked: Vec<(u32, u32)> = appointment::occupying(db, barbershop_id, date, barber.as_deref())
        .await?
        .iter()
        .map(appointment::Model::interval)
        .collect();
    Ok(AvailableSlots { date, barber, time_slots: stats::slot_availability(&booked) })
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockSlotInput {
    pub date: String,
    pub time: String,
    pub barber_name: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Hold a 30 minute slot with a placeholder booking.
pub async fn block_slot(db: &DatabaseConnection, barbershop_id: Uuid, input: BlockSlotInput) -> ServiceResult<appointment::Model> {
    let date = parse_date("date", &input.date)?;
    let time: NaiveTime = parse_time("time", &input.time)?;
    let reason = input.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()).unwrap_or_else(|| "Blocked".into());
    let blocked = appointments::insert(
        db,
        barbershop_id,
        AppointmentInput {
            customer_name: BLOCKED_CUSTOMER.into(),
            customer_phone: String::new(),
            customer_email: None,
            service: reason.clone(),
            barber_name: input.barber_name,
            appointment_date: date,
            appointment_time: time,
            duration_minutes: Some(stats::SLOT_MINUTES as i32),
            status: Some(AppointmentStatus::Confirmed),
            notes: Some(format!("Time slot blocked: {reason}")),
            amount: None,
        },
    )
    .await?;
    activity::log(
        db,
        NewActivity::new(barbershop_id, ActionType::TimeBlocked, format!("Time slot blocked: {} {} - {}", date, hhmm(time), reason))
            .appointment(blocked.id)
            .metadata(json!({ "barber_name": blocked.barber_name })),
    )
    .await?;
    Ok(blocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop};

    #[test]
    fn month_range_covers_whole_month() {
        let (s, e) = month_range(2024, 2).unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let (_, dec_end) = month_range(2023, 12).unwrap();
        assert_eq!(dec_end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(month_range(2024, 13).is_err());
    }

    #[tokio::test]
    async fn blocked_slot_shows_as_unavailable() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;
        let input = BlockSlotInput { date: "2031-05-06".into(), time: "10:00".into(), barber_name: "Ravi".into(), reason: None };
        let blocked = block_slot(&db, shop.id, input).await?;
        assert_eq!(blocked.customer_name, BLOCKED_CUSTOMER);
        assert_eq!(blocked.service, "Blocked");

        let slots = available_slots(&db, shop.id, Some("2031-05-06"), Some("Ravi".into())).await?;
        let at = |t: &str| slots.time_slots.iter().find(|s| s.time == t).map(|s| s.available);
        assert_eq!(at("10:00"), Some(false));
        assert_eq!(at("09:30"), Some(true));
        assert_eq!(at("10:30"), Some(true));

        let other_barber = available_slots(&db, shop.id, Some("2031-05-06"), Some("Amit".into())).await?;
        assert!(other_barber.time_slots.iter().all(|s| s.available));

        assert!(matches!(available_slots(&db, shop.id, None, None).await, Err(ServiceError::Validation(_))));
        let bad = BlockSlotInput { date: "06/05/2031".into(), time: "10:00".into(), barber_name: "Ravi".into(), reason: None };
        assert!(matches!(block_slot(&db, shop.id, bad).await, Err(ServiceError::Validation(_))));

        let cal = calendar(&db, shop.id, Some(5), Some(2031)).await?;
        assert_eq!(cal.get("2031-05-06").map(Vec::len), Some(1));
        Ok(())
    }
}
