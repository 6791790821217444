//! Recorded sales and the daily summary.

use chrono::{Local, NaiveDate, Utc};
use models::activity_log::NewActivity;
use models::enums::{ActionType, PaymentMethod};
use models::{appointment, sale, validate};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};
use crate::query::{icontains, term};
use crate::stats::{self, Bucket};

#[derive(Debug, Clone, Deserialize)]
pub struct SaleInput {
    pub customer_name: String,
    pub service: String,
    pub barber_name: String,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalePatch {
    pub customer_name: Option<String>,
    pub service: Option<String>,
    pub barber_name: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub appointment_id: Option<Uuid>,
    pub notes: Option<String>,
    pub sale_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentBreakdown {
    pub payment_method: String,
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceBreakdown {
    pub service: String,
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_sales: f64,
    pub total_transactions: u64,
    pub payment_breakdown: Vec<PaymentBreakdown>,
    pub service_breakdown: Vec<ServiceBreakdown>,
}

fn check_text(field: &str, value: &str) -> ServiceResult<()> {
    validate::required(field, value)?;
    validate::max_len(field, value, 100)?;
    Ok(())
}

/// The linked appointment must be the tenant's and not already invoiced.
async fn check_appointment_link<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, appointment_id: Uuid, exclude: Option<Uuid>) -> ServiceResult<()> {
    let owned = appointment::Entity::find_by_id(appointment_id)
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?;
    if owned.is_none() {
        return Err(ServiceError::validation("appointment_id does not refer to one of your appointments"));
    }
    let mut q = sale::Entity::find().filter(sale::Column::AppointmentId.eq(appointment_id));
    if let Some(id) = exclude {
        q = q.filter(sale::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::conflict("a sale is already recorded for this appointment"));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<sale::Model> {
    sale::Entity::find_by_id(id)
        .filter(sale::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("sale"))
}

fn entry(barbershop_id: Uuid, action: ActionType, s: &sale::Model) -> NewActivity {
    NewActivity::new(
        barbershop_id,
        action,
        format!("Sale of {} to {} for ₹{:.2} ({})", s.service, s.customer_name, s.amount, s.payment_method),
    )
    .sale(s.id)
    .metadata(json!({ "amount": s.amount, "payment_method": s.payment_method, "barber_name": s.barber_name }))
}

async fn insert(db: &DatabaseConnection, barbershop_id: Uuid, input: SaleInput) -> ServiceResult<sale::Model> {
    check_text("customer_name", &input.customer_name)?;
    check_text("service", &input.service)?;
    check_text("barber_name", &input.barber_name)?;
    let amount = validate::positive_money("amount", input.amount)?;
    if let Some(aid) = input.appointment_id {
        check_appointment_link(db, barbershop_id, aid, None).await?;
    }
    let now = Utc::now();
    let am = sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        customer_name: Set(input.customer_name.trim().to_string()),
        service: Set(input.service.trim().to_string()),
        barber_name: Set(input.barber_name.trim().to_string()),
        amount: Set(amount),
        payment_method: Set(input.payment_method.as_str().to_string()),
        appointment_id: Set(input.appointment_id),
        notes: Set(input.notes.unwrap_or_default()),
        sale_date: Set(input.sale_date.unwrap_or_else(|| Local::now().date_naive())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: SaleInput) -> ServiceResult<sale::Model> {
    create_logged_as(db, barbershop_id, input, ActionType::SaleRecorded).await
}

pub async fn create_logged_as(db: &DatabaseConnection, barbershop_id: Uuid, input: SaleInput, action: ActionType) -> ServiceResult<sale::Model> {
    let created = insert(db, barbershop_id, input).await?;
    activity::log(db, entry(barbershop_id, action, &created)).await?;
    info!(barbershop_id = %barbershop_id, sale_id = %created.id, amount = created.amount, "sale_recorded");
    Ok(created)
}

pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, filter: SaleFilter) -> ServiceResult<Vec<sale::Model>> {
    let mut q = sale::Entity::find().filter(sale::Column::BarbershopId.eq(barbershop_id));
    if let Some(d) = filter.start_date {
        q = q.filter(sale::Column::SaleDate.gte(d));
    }
    if let Some(d) = filter.end_date {
        q = q.filter(sale::Column::SaleDate.lte(d));
    }
    if let Some(p) = filter.payment_method {
        q = q.filter(sale::Column::PaymentMethod.eq(p.as_str()));
    }
    if let Some(s) = term(&filter.service) {
        q = q.filter(icontains::<sale::Entity>(sale::Column::Service, s));
    }
    Ok(q.order_by_desc(sale::Column::SaleDate).order_by_desc(sale::Column::CreatedAt).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<sale::Model> {
    find_owned(db, barbershop_id, id).await
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: SalePatch) -> ServiceResult<sale::Model> {
    let current = find_owned(db, barbershop_id, id).await?;
    let mut am: sale::ActiveModel = current.into();
    if let Some(v) = patch.customer_name {
        check_text("customer_name", &v)?;
        am.customer_name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.service {
        check_text("service", &v)?;
        am.service = Set(v.trim().to_string());
    }
    if let Some(v) = patch.barber_name {
        check_text("barber_name", &v)?;
        am.barber_name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.amount {
        am.amount = Set(validate::positive_money("amount", v)?);
    }
    if let Some(v) = patch.payment_method {
        am.payment_method = Set(v.as_str().to_string());
    }
    if let Some(aid) = patch.appointment_id {
        check_appointment_link(db, barbershop_id, aid, Some(id)).await?;
        am.appointment_id = Set(Some(aid));
    }
    if let Some(v) = patch.notes {
        am.notes = Set(v);
    }
    if let Some(v) = patch.sale_date {
        am.sale_date = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    activity::log(db, entry(barbershop_id, ActionType::SaleUpdated, &updated)).await?;
    Ok(updated)
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    sale::Entity::delete_by_id(found.id).exec(db).await?;
    Ok(())
}

/// Totals for one day's sales.
pub fn summarize(date: NaiveDate, rows: &[sale::Model]) -> DailySummary {
    let payments = stats::group(rows, |s| s.payment_method.clone(), |s| s.amount);
    let services = stats::group(rows, |s| s.service.clone(), |s| s.amount);
    DailySummary {
        date,
        total_sales: stats::sum(rows.iter().map(|s| s.amount)),
        total_transactions: rows.len() as u64,
        payment_breakdown: payments
            .into_iter()
            .map(|Bucket { key, count, total }| PaymentBreakdown { payment_method: key, total, count })
            .collect(),
        service_breakdown: services
            .into_iter()
            .map(|Bucket { key, count, total }| ServiceBreakdown { service: key, total, count })
            .collect(),
    }
}

pub async fn daily_summary(db: &DatabaseConnection, barbershop_id: Uuid, date: Option<NaiveDate>) -> ServiceResult<DailySummary> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let rows = sale::Entity::find()
        .filter(sale::Column::BarbershopId.eq(barbershop_id))
        .filter(sale::Column::SaleDate.eq(date))
        .all(db)
        .await?;
    Ok(summarize(date, &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop};

    fn row(service: &str, method: &str, amount: f64) -> sale::Model {
        let now = Utc::now();
        sale::Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::nil(),
            customer_name: "C".into(),
            service: service.into(),
            barber_name: "B".into(),
            amount,
            payment_method: method.into(),
            appointment_id: None,
            notes: String::new(),
            sale_date: now.date_naive(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn summary_breaks_down_by_method_and_service() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let s = summarize(day, &[row("Cut", "Cash", 200.0), row("Cut", "UPI", 250.0), row("Shave", "Cash", 99.99)]);
        assert_eq!(s.total_sales, 549.99);
        assert_eq!(s.total_transactions, 3);
        let cash = s.payment_breakdown.iter().find(|p| p.payment_method == "Cash").unwrap();
        assert_eq!((cash.count, cash.total), (2, 299.99));
        let cut = s.service_breakdown.iter().find(|p| p.service == "Cut").unwrap();
        assert_eq!(cut.total, 450.0);
        assert_eq!(summarize(day, &[]).total_sales, 0.0);
    }

    #[tokio::test]
    async fn sale_links_to_one_appointment_only() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;
        let appt = crate::appointments::create(
            &db,
            shop.id,
            crate::appointments::AppointmentInput {
                customer_name: "Kiran".into(),
                customer_phone: String::new(),
                customer_email: None,
                service: "Beard".into(),
                barber_name: "Ravi".into(),
                appointment_date: NaiveDate::from_ymd_opt(2031, 1, 5).unwrap(),
                appointment_time: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                duration_minutes: None,
                status: None,
                notes: None,
                amount: None,
            },
        )
        .await?;
        let input = SaleInput {
            customer_name: "Kiran".into(),
            service: "Beard".into(),
            barber_name: "Ravi".into(),
            amount: 150.456,
            payment_method: PaymentMethod::Upi,
            appointment_id: Some(appt.appointment.id),
            notes: None,
            sale_date: None,
        };
        let first = create(&db, shop.id, input.clone()).await?;
        assert_eq!(first.amount, 150.46);
        assert!(matches!(create(&db, shop.id, input.clone()).await, Err(ServiceError::Conflict(_))));

        let zero = SaleInput { amount: 0.0, appointment_id: None, ..input };
        assert!(matches!(create(&db, shop.id, zero).await, Err(ServiceError::Model(_))));

        let summary = daily_summary(&db, shop.id, None).await?;
        assert_eq!(summary.total_transactions, 1);
        models::user::hard_delete(&db, shop.id).await?;
        Ok(())
    }
}
