//! Barbershop appointments with overlap protection.

use chrono::{Local, NaiveDate, NaiveTime, Utc};
use models::activity_log::NewActivity;
use models::appointment::{self, AppointmentView, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
use models::enums::{ActionType, AppointmentStatus};
use models::validate;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};
use crate::query::{icontains, term};
use crate::time_fmt::{flex_time, flex_time_opt, hhmm};

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentInput {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub service: String,
    pub barber_name: String,
    pub appointment_date: NaiveDate,
    #[serde(deserialize_with = "flex_time::deserialize")]
    pub appointment_time: NaiveTime,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub service: Option<String>,
    pub barber_name: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
    pub appointment_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub barber: Option<String>,
}

fn check_text(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    validate::required(field, value)?;
    validate::max_len(field, value, max)?;
    Ok(())
}

fn check_duration(minutes: i32) -> ServiceResult<()> {
    if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(ServiceError::validation(format!("duration_minutes must be between 1 and {MAX_DURATION_MINUTES}")));
    }
    Ok(())
}

fn check_contact(phone: &str, email: Option<&str>) -> ServiceResult<Option<String>> {
    if !phone.trim().is_empty() {
        validate::validate_phone(phone.trim())?;
    }
    Ok(match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => Some(validate::normalize_email(e)?),
        None => None,
    })
}

/// Refuse a booking whose interval overlaps another slot-holding booking of the same barber.
pub async fn ensure_slot_free<C: ConnectionTrait>(
    db: &C,
    barbershop_id: Uuid,
    barber_name: &str,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: i32,
    exclude: Option<Uuid>,
) -> ServiceResult<()> {
    let wanted = appointment::interval(time, duration_minutes);
    let booked = appointment::occupying(db, barbershop_id, date, Some(barber_name)).await?;
    if let Some(clash) = booked
        .iter()
        .filter(|a| Some(a.id) != exclude)
        .find(|a| appointment::overlaps(wanted, a.interval()))
    {
        return Err(ServiceError::conflict(format!(
            "{} already has an appointment at {} on {}",
            barber_name,
            hhmm(clash.appointment_time),
            date
        )));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<appointment::Model> {
    appointment::Entity::find_by_id(id)
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("appointment"))
}

/// Validate and insert without logging.
pub async fn insert<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, input: AppointmentInput) -> ServiceResult<appointment::Model> {
    check_text("customer_name", &input.customer_name, 100)?;
    check_text("service", &input.service, 100)?;
    check_text("barber_name", &input.barber_name, 100)?;
    let email = check_contact(&input.customer_phone, input.customer_email.as_deref())?;
    let duration = input.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    check_duration(duration)?;
    let amount = validate::non_negative_money("amount", input.amount.unwrap_or(0.0))?;
    let status = input.status.unwrap_or(AppointmentStatus::Confirmed);
    if status.occupies_slot() {
        ensure_slot_free(db, barbershop_id, input.barber_name.trim(), input.appointment_date, input.appointment_time, duration, None).await?;
    }

    let now = Utc::now().into();
    let am = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        customer_name: Set(input.customer_name.trim().to_string()),
        customer_phone: Set(input.customer_phone.trim().to_string()),
        customer_email: Set(email),
        service: Set(input.service.trim().to_string()),
        barber_name: Set(input.barber_name.trim().to_string()),
        appointment_date: Set(input.appointment_date),
        appointment_time: Set(input.appointment_time),
        duration_minutes: Set(duration),
        status: Set(status.as_str().to_string()),
        notes: Set(input.notes.unwrap_or_default()),
        amount: Set(amount),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

fn created_entry(barbershop_id: Uuid, action: ActionType, a: &appointment::Model) -> NewActivity {
    NewActivity::new(
        barbershop_id,
        action,
        format!("Appointment for {} ({}) on {} at {}", a.customer_name, a.service, a.appointment_date, hhmm(a.appointment_time)),
    )
    .appointment(a.id)
    .metadata(json!({ "customer_name": a.customer_name, "service": a.service, "barber_name": a.barber_name }))
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: AppointmentInput) -> ServiceResult<AppointmentView> {
    let created = insert(db, barbershop_id, input).await?;
    activity::log(db, created_entry(barbershop_id, ActionType::AppointmentCreated, &created)).await?;
    info!(barbershop_id = %barbershop_id, appointment_id = %created.id, "appointment_created");
    Ok(created.view())
}

/// Create and log with a custom action (walk-ins, blocked slots).
pub async fn create_logged_as(
    db: &DatabaseConnection,
    barbershop_id: Uuid,
    input: AppointmentInput,
    action: ActionType,
) -> ServiceResult<appointment::Model> {
    let created = insert(db, barbershop_id, input).await?;
    activity::log(db, created_entry(barbershop_id, action, &created)).await?;
    Ok(created)
}

pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, filter: AppointmentFilter) -> ServiceResult<Vec<AppointmentView>> {
    let mut q = appointment::Entity::find().filter(appointment::Column::BarbershopId.eq(barbershop_id));
    if let Some(d) = filter.date {
        q = q.filter(appointment::Column::AppointmentDate.eq(d));
    }
    if let Some(s) = filter.status {
        q = q.filter(appointment::Column::Status.eq(s.as_str()));
    }
    if let Some(b) = term(&filter.barber) {
        q = q.filter(icontains::<appointment::Entity>(appointment::Column::BarberName, b));
    }
    let rows = q
        .order_by_desc(appointment::Column::AppointmentDate)
        .order_by_desc(appointment::Column::AppointmentTime)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(appointment::Model::view).collect())
}

pub async fn today(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<AppointmentView>> {
    let rows = appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .filter(appointment::Column::AppointmentDate.eq(Local::now().date_naive()))
        .order_by_asc(appointment::Column::AppointmentTime)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(appointment::Model::view).collect())
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<AppointmentView> {
    Ok(find_owned(db, barbershop_id, id).await?.view())
}

fn action_for(old: &str, new: AppointmentStatus) -> ActionType {
    if old == new.as_str() {
        return ActionType::AppointmentUpdated;
    }
    match new {
        AppointmentStatus::Completed => ActionType::AppointmentCompleted,
        AppointmentStatus::Cancelled => ActionType::AppointmentCancelled,
        _ => ActionType::AppointmentUpdated,
    }
}

/// Apply a patch to a row already known to belong to `barbershop_id`.
pub async fn apply_patch<C: ConnectionTrait>(db: &C, current: appointment::Model, patch: AppointmentPatch) -> ServiceResult<(appointment::Model, ActionType)> {
    let barbershop_id = current.barbershop_id;
    let id = current.id;
    let old_status = current.status.clone();
    let mut barber = current.barber_name.clone();
    let mut date = current.appointment_date;
    let mut time = current.appointment_time;
    let mut duration = current.duration_minutes;
    let mut status: AppointmentStatus = current.status()?;
    let mut phone = current.customer_phone.clone();
    let mut email = current.customer_email.clone();
    let mut am: appointment::ActiveModel = current.into();

    if let Some(v) = patch.customer_name {
        check_text("customer_name", &v, 100)?;
        am.customer_name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.service {
        check_text("service", &v, 100)?;
        am.service = Set(v.trim().to_string());
    }
    if let Some(v) = patch.barber_name {
        check_text("barber_name", &v, 100)?;
        barber = v.trim().to_string();
        am.barber_name = Set(barber.clone());
    }
    if let Some(v) = patch.customer_phone {
        phone = v.trim().to_string();
    }
    if let Some(v) = patch.customer_email {
        email = Some(v);
    }
    let email = check_contact(&phone, email.as_deref())?;
    am.customer_phone = Set(phone);
    am.customer_email = Set(email);
    if let Some(v) = patch.appointment_date {
        date = v;
        am.appointment_date = Set(v);
    }
    if let Some(v) = patch.appointment_time {
        time = v;
        am.appointment_time = Set(v);
    }
    if let Some(v) = patch.duration_minutes {
        check_duration(v)?;
        duration = v;
        am.duration_minutes = Set(v);
    }
    if let Some(v) = patch.status {
        status = v;
        am.status = Set(v.as_str().to_string());
    }
    if let Some(v) = patch.notes {
        am.notes = Set(v);
    }
    if let Some(v) = patch.amount {
        am.amount = Set(validate::non_negative_money("amount", v)?);
    }
    if status.occupies_slot() {
        ensure_slot_free(db, barbershop_id, &barber, date, time, duration, Some(id)).await?;
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    Ok((updated, action_for(&old_status, status)))
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: AppointmentPatch) -> ServiceResult<AppointmentView> {
    let current = find_owned(db, barbershop_id, id).await?;
    let (updated, action) = apply_patch(db, current, patch).await?;
    activity::log(db, created_entry(barbershop_id, action, &updated)).await?;
    Ok(updated.view())
}

pub async fn set_status(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, status: AppointmentStatus) -> ServiceResult<AppointmentView> {
    update(db, barbershop_id, id, AppointmentPatch { status: Some(status), ..Default::default() }).await
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    appointment::Entity::delete_by_id(found.id).exec(db).await?;
    info!(barbershop_id = %barbershop_id, appointment_id = %id, "appointment_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop};

    fn booking(barber: &str, h: u32, m: u32, minutes: i32) -> AppointmentInput {
        AppointmentInput {
            customer_name: "Arjun".into(),
            customer_phone: "+919811111111".into(),
            customer_email: None,
            service: "Haircut".into(),
            barber_name: barber.into(),
            appointment_date: NaiveDate::from_ymd_opt(2031, 5, 10).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            duration_minutes: Some(minutes),
            status: None,
            notes: None,
            amount: Some(300.0),
        }
    }

    #[test]
    fn status_changes_pick_matching_action() {
        assert_eq!(action_for("confirmed", AppointmentStatus::Completed), ActionType::AppointmentCompleted);
        assert_eq!(action_for("confirmed", AppointmentStatus::Cancelled), ActionType::AppointmentCancelled);
        assert_eq!(action_for("completed", AppointmentStatus::Completed), ActionType::AppointmentUpdated);
        assert_eq!(action_for("pending", AppointmentStatus::Confirmed), ActionType::AppointmentUpdated);
    }

    #[tokio::test]
    async fn overlapping_bookings_conflict_per_barber() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;

        let first = create(&db, shop.id, booking("Ravi", 10, 0, 60)).await?;
        let clash = create(&db, shop.id, booking("Ravi", 10, 30, 30)).await;
        assert!(matches!(clash, Err(ServiceError::Conflict(_))));
        create(&db, shop.id, booking("Ravi", 11, 0, 30)).await?;
        create(&db, shop.id, booking("Meena", 10, 30, 30)).await?;

        let cancelled = set_status(&db, shop.id, first.appointment.id, AppointmentStatus::Cancelled).await?;
        assert_eq!(cancelled.appointment.status, "cancelled");
        create(&db, shop.id, booking("Ravi", 10, 0, 30)).await?;

        let other = seed_barbershop(&db).await?;
        assert!(matches!(get(&db, other.id, first.appointment.id).await, Err(ServiceError::NotFound(_))));

        let filtered = list(&db, shop.id, AppointmentFilter { barber: Some("rav".into()), ..Default::default() }).await?;
        assert_eq!(filtered.len(), 3);
        models::user::hard_delete(&db, shop.id).await?;
        models::user::hard_delete(&db, other.id).await?;
        Ok(())
    }
}
