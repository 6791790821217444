//! Staff members and their availability windows.

use chrono::{Local, NaiveDate, NaiveTime, Utc};
use models::activity_log::NewActivity;
use models::enums::{ActionType, StaffRole, StaffStatus};
use models::staff::{self, StaffView};
use models::{staff_availability, validate};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};
use crate::query::{icontains, term};
use crate::time_fmt::flex_time_opt;

#[derive(Debug, Clone, Deserialize)]
pub struct StaffInput {
    pub name: String,
    pub role: StaffRole,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub status: Option<StaffStatus>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffPatch {
    pub name: Option<String>,
    pub role: Option<StaffRole>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub schedule: Option<String>,
    pub status: Option<StaffStatus>,
    pub salary: Option<f64>,
    pub join_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffFilter {
    pub status: Option<StaffStatus>,
    pub role: Option<StaffRole>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarberRef {
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

fn clean_email(email: Option<String>) -> ServiceResult<String> {
    match email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => Ok(validate::normalize_email(e)?),
        None => Ok(String::new()),
    }
}

async fn ensure_phone_free<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, phone: &str, exclude: Option<Uuid>) -> ServiceResult<()> {
    let mut q = staff::Entity::find()
        .filter(staff::Column::BarbershopId.eq(barbershop_id))
        .filter(staff::Column::Phone.eq(phone));
    if let Some(id) = exclude {
        q = q.filter(staff::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::conflict("a staff member with this phone number already exists"));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<staff::Model> {
    staff::Entity::find_by_id(id)
        .filter(staff::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("staff member"))
}

fn entry(barbershop_id: Uuid, action: ActionType, s: &staff::Model) -> NewActivity {
    let verb = if action == ActionType::StaffAdded { "added" } else { "updated" };
    NewActivity::new(barbershop_id, action, format!("Staff member {} ({}) {}", s.name, s.role, verb))
        .staff(s.id)
        .metadata(json!({ "role": s.role, "status": s.status }))
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: StaffInput) -> ServiceResult<StaffView> {
    validate::required("name", &input.name)?;
    validate::max_len("name", &input.name, 100)?;
    let phone = input.phone.trim().to_string();
    validate::validate_phone(&phone)?;
    ensure_phone_free(db, barbershop_id, &phone, None).await?;
    let salary = input.salary.map(|s| validate::non_negative_money("salary", s)).transpose()?;
    let now = Utc::now();
    let am = staff::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        name: Set(input.name.trim().to_string()),
        role: Set(input.role.as_str().to_string()),
        phone: Set(phone),
        email: Set(clean_email(input.email)?),
        schedule: Set(input.schedule.unwrap_or_default()),
        status: Set(input.status.unwrap_or(StaffStatus::Active).as_str().to_string()),
        salary: Set(salary),
        join_date: Set(input.join_date.unwrap_or_else(|| Local::now().date_naive())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await?;
    activity::log(db, entry(barbershop_id, ActionType::StaffAdded, &created)).await?;
    info!(barbershop_id = %barbershop_id, staff_id = %created.id, "staff_added");
    Ok(created.view())
}

pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, filter: StaffFilter) -> ServiceResult<Vec<StaffView>> {
    let mut q = staff::Entity::find().filter(staff::Column::BarbershopId.eq(barbershop_id));
    if let Some(s) = filter.status {
        q = q.filter(staff::Column::Status.eq(s.as_str()));
    }
    if let Some(r) = filter.role {
        q = q.filter(staff::Column::Role.eq(r.as_str()));
    }
    let rows = q.order_by_asc(staff::Column::Name).all(db).await?;
    Ok(rows.into_iter().map(staff::Model::view).collect())
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<StaffView> {
    Ok(find_owned(db, barbershop_id, id).await?.view())
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: StaffPatch) -> ServiceResult<StaffView> {
    let current = find_owned(db, barbershop_id, id).await?;
    let mut am: staff::ActiveModel = current.into();
    if let Some(v) = patch.name {
        validate::required("name", &v)?;
        validate::max_len("name", &v, 100)?;
        am.name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.role {
        am.role = Set(v.as_str().to_string());
    }
    if let Some(v) = patch.phone {
        let phone = v.trim().to_string();
        validate::validate_phone(&phone)?;
        ensure_phone_free(db, barbershop_id, &phone, Some(id)).await?;
        am.phone = Set(phone);
    }
    if patch.email.is_some() {
        am.email = Set(clean_email(patch.email)?);
    }
    if let Some(v) = patch.schedule {
        am.schedule = Set(v);
    }
    if let Some(v) = patch.status {
        am.status = Set(v.as_str().to_string());
    }
    if let Some(v) = patch.salary {
        am.salary = Set(Some(validate::non_negative_money("salary", v)?));
    }
    if let Some(v) = patch.join_date {
        am.join_date = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    activity::log(db, entry(barbershop_id, ActionType::StaffUpdated, &updated)).await?;
    Ok(updated.view())
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    staff::Entity::delete_by_id(found.id).exec(db).await?;
    Ok(())
}

/// Active members whose role cuts hair.
pub async fn active_barbers(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<BarberRef>> {
    let rows = staff::Entity::find()
        .filter(staff::Column::BarbershopId.eq(barbershop_id))
        .filter(staff::Column::Status.eq(StaffStatus::Active.as_str()))
        .filter(staff::Column::Role.is_in([StaffRole::Barber.as_str(), StaffRole::SeniorBarber.as_str()]))
        .order_by_asc(staff::Column::Name)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|s| BarberRef { id: s.id, name: s.name, role: s.role }).collect())
}

pub async fn active_members(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<staff::Model>> {
    Ok(staff::Entity::find()
        .filter(staff::Column::BarbershopId.eq(barbershop_id))
        .filter(staff::Column::Status.eq(StaffStatus::Active.as_str()))
        .order_by_asc(staff::Column::Name)
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityInput {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityPatch {
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
    pub end_time: Option<NaiveTime>,
    pub is_available: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityFilter {
    pub staff_name: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    #[serde(flatten)]
    pub availability: staff_availability::Model,
    pub staff_name: String,
}

fn check_window(start: Option<NaiveTime>, end: Option<NaiveTime>) -> ServiceResult<()> {
    if !staff_availability::window_is_valid(start, end) {
        return Err(ServiceError::validation("end_time must be after start_time"));
    }
    Ok(())
}

fn check_notes(notes: &str) -> ServiceResult<()> {
    Ok(validate::max_len("notes", notes, 200)?)
}

async fn find_availability_owned(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<(staff_availability::Model, staff::Model)> {
    let found = staff_availability::Entity::find_by_id(id)
        .find_also_related(staff::Entity)
        .one(db)
        .await?;
    match found {
        Some((a, Some(s))) if s.barbershop_id == barbershop_id => Ok((a, s)),
        _ => Err(ServiceError::not_found("availability")),
    }
}

pub async fn list_availability(db: &DatabaseConnection, barbershop_id: Uuid, filter: AvailabilityFilter) -> ServiceResult<Vec<AvailabilityView>> {
    let mut q = staff_availability::Entity::find()
        .find_also_related(staff::Entity)
        .filter(staff::Column::BarbershopId.eq(barbershop_id));
    if let Some(name) = term(&filter.staff_name) {
        q = q.filter(icontains::<staff::Entity>(staff::Column::Name, name));
    }
    if let Some(d) = filter.date {
        q = q.filter(staff_availability::Column::Date.eq(d));
    }
    let rows = q
        .order_by_asc(staff_availability::Column::Date)
        .order_by_asc(staff_availability::Column::StartTime)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(a, s)| AvailabilityView { availability: a, staff_name: s.map(|s| s.name).unwrap_or_default() })
        .collect())
}

/// Insert or update on `(staff_id, date, start_time)`; the flag is true when a row was created.
pub async fn upsert_availability(db: &DatabaseConnection, barbershop_id: Uuid, input: AvailabilityInput) -> ServiceResult<(AvailabilityView, bool)> {
    let member = staff::Entity::find_by_id(input.staff_id)
        .filter(staff::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("staff_id does not refer to one of your staff members"))?;
    check_window(input.start_time, input.end_time)?;
    let notes = input.notes.unwrap_or_default();
    check_notes(&notes)?;

    let mut q = staff_availability::Entity::find()
        .filter(staff_availability::Column::StaffId.eq(member.id))
        .filter(staff_availability::Column::Date.eq(input.date));
    q = match input.start_time {
        Some(t) => q.filter(staff_availability::Column::StartTime.eq(t)),
        None => q.filter(staff_availability::Column::StartTime.is_null()),
    };
    let now = Utc::now();
    let (saved, created) = match q.one(db).await? {
        Some(existing) => {
            let mut am: staff_availability::ActiveModel = existing.into();
            am.end_time = Set(input.end_time);
            am.is_available = Set(input.is_available.unwrap_or(true));
            am.notes = Set(notes);
            am.updated_at = Set(now.into());
            (am.update(db).await?, false)
        }
        None => {
            let am = staff_availability::ActiveModel {
                id: Set(Uuid::new_v4()),
                staff_id: Set(member.id),
                date: Set(input.date),
                start_time: Set(input.start_time),
                end_time: Set(input.end_time),
                is_available: Set(input.is_available.unwrap_or(true)),
                notes: Set(notes),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            (am.insert(db).await?, true)
        }
    };
    Ok((AvailabilityView { availability: saved, staff_name: member.name }, created))
}

pub async fn get_availability(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<AvailabilityView> {
    let (a, s) = find_availability_owned(db, barbershop_id, id).await?;
    Ok(AvailabilityView { availability: a, staff_name: s.name })
}

pub async fn update_availability(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: AvailabilityPatch) -> ServiceResult<AvailabilityView> {
    let (current, member) = find_availability_owned(db, barbershop_id, id).await?;
    let start = patch.start_time.or(current.start_time);
    let end = patch.end_time.or(current.end_time);
    check_window(start, end)?;
    let mut am: staff_availability::ActiveModel = current.into();
    if let Some(d) = patch.date {
        am.date = Set(d);
    }
    am.start_time = Set(start);
    am.end_time = Set(end);
    if let Some(v) = patch.is_available {
        am.is_available = Set(v);
    }
    if let Some(v) = patch.notes {
        check_notes(&v)?;
        am.notes = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let saved = am.update(db).await?;
    Ok(AvailabilityView { availability: saved, staff_name: member.name })
}

pub async fn delete_availability(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let (a, _) = find_availability_owned(db, barbershop_id, id).await?;
    staff_availability::Entity::delete_by_id(a.id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop};

    fn member(phone: &str, role: StaffRole) -> StaffInput {
        StaffInput {
            name: format!("Member {phone}"),
            role,
            phone: phone.into(),
            email: Some("Staff@Shop.com".into()),
            schedule: None,
            status: None,
            salary: Some(15000.0),
            join_date: None,
        }
    }

    #[tokio::test]
    async fn staff_phone_unique_per_shop_and_availability_upserts() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;
        let other = seed_barbershop(&db).await?;

        let barber = create(&db, shop.id, member("+919800000001", StaffRole::SeniorBarber)).await?;
        assert!(barber.is_barber);
        assert_eq!(barber.staff.email, "staff@shop.com");
        let dup = create(&db, shop.id, member("+919800000001", StaffRole::Manager)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        create(&db, other.id, member("+919800000001", StaffRole::Barber)).await?;
        create(&db, shop.id, member("+919800000002", StaffRole::Receptionist)).await?;
        assert_eq!(active_barbers(&db, shop.id).await?.len(), 1);

        let day = NaiveDate::from_ymd_opt(2031, 2, 3).unwrap();
        let input = AvailabilityInput {
            staff_id: barber.staff.id,
            date: day,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            is_available: None,
            notes: None,
        };
        let (_, created) = upsert_availability(&db, shop.id, input.clone()).await?;
        assert!(created);
        let (again, created) = upsert_availability(&db, shop.id, AvailabilityInput { is_available: Some(false), ..input.clone() }).await?;
        assert!(!created);
        assert!(!again.availability.is_available);

        let foreign = upsert_availability(&db, other.id, input.clone()).await;
        assert!(matches!(foreign, Err(ServiceError::Validation(_))));
        let inverted = AvailabilityInput { end_time: NaiveTime::from_hms_opt(8, 0, 0), ..input };
        assert!(matches!(upsert_availability(&db, shop.id, inverted).await, Err(ServiceError::Validation(_))));

        let listed = list_availability(&db, shop.id, AvailabilityFilter { staff_name: Some("member".into()), date: Some(day) }).await?;
        assert_eq!(listed.len(), 1);
        models::user::hard_delete(&db, shop.id).await?;
        models::user::hard_delete(&db, other.id).await?;
        Ok(())
    }
}
