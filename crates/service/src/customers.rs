//! Customer records and visit statistics.

use chrono::{NaiveDate, Utc};
use models::activity_log::NewActivity;
use models::enums::{ActionType, AppointmentStatus};
use models::{appointment, customer, sale, validate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};
use crate::query::icontains;
use crate::stats;

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

fn clean_email(email: Option<&str>) -> ServiceResult<String> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => Ok(validate::normalize_email(e)?),
        None => Ok(String::new()),
    }
}

async fn ensure_phone_free<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, phone: &str, exclude: Option<Uuid>) -> ServiceResult<()> {
    let mut q = customer::Entity::find()
        .filter(customer::Column::BarbershopId.eq(barbershop_id))
        .filter(customer::Column::Phone.eq(phone));
    if let Some(id) = exclude {
        q = q.filter(customer::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::conflict("a customer with this phone number already exists"));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<customer::Model> {
    customer::Entity::find_by_id(id)
        .filter(customer::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer"))
}

fn entry(barbershop_id: Uuid, action: ActionType, c: &customer::Model) -> NewActivity {
    let verb = if action == ActionType::CustomerAdded { "added" } else { "updated" };
    NewActivity::new(barbershop_id, action, format!("Customer {} {}", c.name, verb))
        .customer(c.id)
        .metadata(json!({ "phone": c.phone }))
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: CustomerInput) -> ServiceResult<customer::Model> {
    validate::required("name", &input.name)?;
    validate::max_len("name", &input.name, 100)?;
    let phone = input.phone.trim().to_string();
    validate::validate_phone(&phone)?;
    ensure_phone_free(db, barbershop_id, &phone, None).await?;
    let now = Utc::now();
    let am = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        name: Set(input.name.trim().to_string()),
        phone: Set(phone),
        email: Set(clean_email(input.email.as_deref())?),
        notes: Set(input.notes.unwrap_or_default()),
        total_visits: Set(0),
        last_visit_date: Set(None),
        total_spent: Set(0.0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await?;
    activity::log(db, entry(barbershop_id, ActionType::CustomerAdded, &created)).await?;
    Ok(created)
}

/// Name or phone contains `search`, case-insensitively.
pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, search: Option<String>) -> ServiceResult<Vec<customer::Model>> {
    let mut q = customer::Entity::find().filter(customer::Column::BarbershopId.eq(barbershop_id));
    if let Some(s) = crate::query::term(&search) {
        q = q.filter(
            Condition::any()
                .add(icontains::<customer::Entity>(customer::Column::Name, s))
                .add(icontains::<customer::Entity>(customer::Column::Phone, s)),
        );
    }
    Ok(q.order_by_asc(customer::Column::Name).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<customer::Model> {
    find_owned(db, barbershop_id, id).await
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: CustomerPatch) -> ServiceResult<customer::Model> {
    let current = find_owned(db, barbershop_id, id).await?;
    let mut am: customer::ActiveModel = current.into();
    if let Some(v) = patch.name {
        validate::required("name", &v)?;
        validate::max_len("name", &v, 100)?;
        am.name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.phone {
        let phone = v.trim().to_string();
        validate::validate_phone(&phone)?;
        ensure_phone_free(db, barbershop_id, &phone, Some(id)).await?;
        am.phone = Set(phone);
    }
    if let Some(v) = patch.email {
        am.email = Set(clean_email(Some(&v))?);
    }
    if let Some(v) = patch.notes {
        am.notes = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    activity::log(db, entry(barbershop_id, ActionType::CustomerUpdated, &updated)).await?;
    Ok(updated)
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    customer::Entity::delete_by_id(found.id).exec(db).await?;
    Ok(())
}

/// Visit count, last visit and spend derived from appointments and sales.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitStats {
    pub total_visits: i32,
    pub last_visit_date: Option<NaiveDate>,
    pub total_spent: f64,
}

pub fn visit_stats(completed_dates: &[NaiveDate], sale_amounts: &[f64]) -> VisitStats {
    VisitStats {
        total_visits: completed_dates.len() as i32,
        last_visit_date: completed_dates.iter().max().copied(),
        total_spent: stats::sum(sale_amounts.iter().copied()),
    }
}

/// Recompute the stored visit statistics for one customer.
pub async fn refresh_stats<C: ConnectionTrait>(db: &C, current: customer::Model) -> ServiceResult<customer::Model> {
    let dates: Vec<NaiveDate> = appointment::Entity::find()
        .select_only()
        .column(appointment::Column::AppointmentDate)
        .filter(appointment::Column::BarbershopId.eq(current.barbershop_id))
        .filter(appointment::Column::CustomerName.eq(current.name.clone()))
        .filter(appointment::Column::Status.eq(AppointmentStatus::Completed.as_str()))
        .into_tuple()
        .all(db)
        .await?;
    let amounts: Vec<f64> = sale::Entity::find()
        .select_only()
        .column(sale::Column::Amount)
        .filter(sale::Column::BarbershopId.eq(current.barbershop_id))
        .filter(sale::Column::CustomerName.eq(current.name.clone()))
        .into_tuple()
        .all(db)
        .await?;
    let s = visit_stats(&dates, &amounts);
    let mut am: customer::ActiveModel = current.into();
    am.total_visits = Set(s.total_visits);
    am.last_visit_date = Set(s.last_visit_date);
    am.total_spent = Set(s.total_spent);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn update_stats(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<customer::Model> {
    let current = find_owned(db, barbershop_id, id).await?;
    refresh_stats(db, current).await
}

/// Refresh the customer with exactly this name, if one exists. Matches the
/// comparison `refresh_stats` uses to collect sales and appointments.
pub async fn refresh_stats_by_name(db: &DatabaseConnection, barbershop_id: Uuid, name: &str) -> ServiceResult<Option<customer::Model>> {
    let found = customer::Entity::find()
        .filter(customer::Column::BarbershopId.eq(barbershop_id))
        .filter(customer::Column::Name.eq(name.trim()))
        .one(db)
        .await?;
    match found {
        Some(c) => Ok(Some(refresh_stats(db, c).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_stats_track_latest_visit() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        let s = visit_stats(&[d(1, 3), d(3, 9), d(2, 1)], &[100.0, 50.255]);
        assert_eq!(s.total_visits, 3);
        assert_eq!(s.last_visit_date, Some(d(3, 9)));
        assert_eq!(s.total_spent, 150.26);
        assert_eq!(visit_stats(&[], &[]), VisitStats { total_visits: 0, last_visit_date: None, total_spent: 0.0 });
    }
}
