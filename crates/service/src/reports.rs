//! Period reports, analytics and data export for a barbershop.

use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};
use models::enums::AppointmentStatus;
use models::{appointment, customer, inventory_item, sale};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::dashboard::{self, StaffPerformance};
use crate::errors::{ServiceError, ServiceResult};
use crate::stats::{self, Bucket, DailyRevenue, HourCount};

pub const ANALYTICS_DAYS: i64 = 30;
pub const EXPORT_DEFAULT_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Both bounds or neither; a missing bound falls back to `default`.
    pub fn or_default(start: Option<NaiveDate>, end: Option<NaiveDate>, default: DateRange) -> ServiceResult<Self> {
        let range = match (start, end) {
            (Some(start), Some(end)) => DateRange { start, end },
            _ => default,
        };
        if range.end < range.start {
            return Err(ServiceError::validation("end_date must not be before start_date"));
        }
        Ok(range)
    }

    pub fn month_to_date(today: NaiveDate) -> Self {
        DateRange { start: stats::first_of_month(today), end: today }
    }

    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange { start: today - Duration::days(days), end: today }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueSummary {
    pub total: f64,
    pub transactions: u64,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub total: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRevenue {
    pub service: String,
    pub count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub date_range: DateRange,
    pub revenue: RevenueSummary,
    pub appointments: AppointmentSummary,
    pub services: Vec<ServiceRevenue>,
    pub staff_performance: Vec<StaffPerformance>,
}

async fn sales_in(db: &DatabaseConnection, barbershop_id: Uuid, range: DateRange) -> ServiceResult<Vec<sale::Model>> {
    Ok(sale::Entity::find()
        .filter(sale::Column::BarbershopId.eq(barbershop_id))
        .filter(sale::Column::SaleDate.between(range.start, range.end))
        .order_by_asc(sale::Column::SaleDate)
        .all(db)
        .await?)
}

async fn appointments_in(db: &DatabaseConnection, barbershop_id: Uuid, range: DateRange) -> ServiceResult<Vec<appointment::Model>> {
    Ok(appointment::Entity::find()
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .filter(appointment::Column::AppointmentDate.between(range.start, range.end))
        .order_by_asc(appointment::Column::AppointmentDate)
        .order_by_asc(appointment::Column::AppointmentTime)
        .all(db)
        .await?)
}

fn count_status(rows: &[appointment::Model], status: AppointmentStatus) -> u64 {
    rows.iter().filter(|a| a.status == status.as_str()).count() as u64
}

pub fn summarize(range: DateRange, sales: &[sale::Model], appointments: &[appointment::Model]) -> ReportSummary {
    let total = stats::sum(sales.iter().map(|s| s.amount));
    let mut services = stats::group(sales, |s| s.service.clone(), |s| s.amount);
    stats::sort_by_total_desc(&mut services);
    ReportSummary {
        date_range: range,
        revenue: RevenueSummary {
            total,
            transactions: sales.len() as u64,
            average: stats::average(total, sales.len() as u64),
        },
        appointments: AppointmentSummary {
            total: appointments.len() as u64,
            completed: count_status(appointments, AppointmentStatus::Completed),
            cancelled: count_status(appointments, AppointmentStatus::Cancelled),
        },
        services: services
            .into_iter()
            .map(|Bucket { key, count, total }| ServiceRevenue { service: key, count, revenue: total })
            .collect(),
        staff_performance: dashboard::performance(sales),
    }
}

pub async fn summary(
    db: &DatabaseConnection,
    barbershop_id: Uuid,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ServiceResult<ReportSummary> {
    let range = DateRange::or_default(start, end, DateRange::month_to_date(Local::now().date_naive()))?;
    let sales = sales_in(db, barbershop_id, range).await?;
    let appointments = appointments_in(db, barbershop_id, range).await?;
    Ok(summarize(range, &sales, &appointments))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePerformance {
    pub service: String,
    pub count: u64,
    pub revenue: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerRetention {
    pub total_customers: u64,
    pub returning_customers: u64,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub date_range: DateRange,
    pub daily_revenue: Vec<DailyRevenue>,
    pub service_performance: Vec<ServicePerformance>,
    pub customer_retention: CustomerRetention,
    pub peak_hours: Vec<HourCount>,
}

pub fn service_performance(sales: &[sale::Model]) -> Vec<ServicePerformance> {
    let mut buckets = stats::group(sales, |s| s.service.clone(), |s| s.amount);
    stats::sort_by_total_desc(&mut buckets);
    buckets
        .into_iter()
        .map(|Bucket { key, count, total }| ServicePerformance {
            service: key,
            count,
            revenue: total,
            avg_price: stats::average(total, count),
        })
        .collect()
}

/// Trailing 30 days ending today.
pub async fn analytics(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Analytics> {
    let today = Local::now().date_naive();
    let range = DateRange { start: today - Duration::days(ANALYTICS_DAYS - 1), end: today };
    let sales = sales_in(db, barbershop_id, range).await?;
    let dated: Vec<(NaiveDate, f64)> = sales.iter().map(|s| (s.sale_date, s.amount)).collect();

    let customers = customer::Entity::find().filter(customer::Column::BarbershopId.eq(barbershop_id));
    let total_customers = customers.clone().count(db).await?;
    let returning_customers = customers.filter(customer::Column::TotalVisits.gt(1)).count(db).await?;

    let completed_times: Vec<NaiveTime> = appointment::Entity::find()
        .select_only()
        .column(appointment::Column::AppointmentTime)
        .filter(appointment::Column::BarbershopId.eq(barbershop_id))
        .filter(appointment::Column::AppointmentDate.between(range.start, range.end))
        .filter(appointment::Column::Status.eq(AppointmentStatus::Completed.as_str()))
        .into_tuple()
        .all(db)
        .await?;

    Ok(Analytics {
        date_range: range,
        daily_revenue: stats::daily_series(range.start, range.end, &dated),
        service_performance: service_performance(&sales),
        customer_retention: CustomerRetention {
            total_customers,
            returning_customers,
            retention_rate: stats::rate(returning_customers, total_customers),
        },
        peak_hours: stats::peak_hours(&completed_times),
    })
}

/// Which collections an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    All,
    Appointments,
    Sales,
    Customers,
    Inventory,
}

impl FromStr for ExportKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "appointments" => Ok(Self::Appointments),
            "sales" => Ok(Self::Sales),
            "customers" => Ok(Self::Customers),
            "inventory" => Ok(Self::Inventory),
            other => Err(ServiceError::validation(format!(
                "unknown export type '{other}'; expected all, appointments, sales, customers or inventory"
            ))),
        }
    }
}

impl ExportKind {
    fn includes(self, other: ExportKind) -> bool {
        self == ExportKind::All || self == other
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub export_date: DateTime<Utc>,
    pub date_range: DateRange,
    pub data: Map<String, Value>,
}

fn to_values<T: Serialize>(rows: Vec<T>) -> ServiceResult<Value> {
    serde_json::to_value(rows).map_err(|e| ServiceError::Internal(e.to_string()))
}

pub async fn export(
    db: &DatabaseConnection,
    barbershop_id: Uuid,
    kind: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ServiceResult<Export> {
    let kind: ExportKind = kind.unwrap_or("all").parse()?;
    let range = DateRange::or_default(start, end, DateRange::last_days(Local::now().date_naive(), EXPORT_DEFAULT_DAYS))?;
    let mut data = Map::new();
    if kind.includes(ExportKind::Appointments) {
        data.insert("appointments".into(), to_values(appointments_in(db, barbershop_id, range).await?)?);
    }
    if kind.includes(ExportKind::Sales) {
        data.insert("sales".into(), to_values(sales_in(db, barbershop_id, range).await?)?);
    }
    if kind.includes(ExportKind::Customers) {
        let rows = customer::Entity::find()
            .filter(customer::Column::BarbershopId.eq(barbershop_id))
            .order_by_asc(customer::Column::Name)
            .all(db)
            .await?;
        data.insert("customers".into(), to_values(rows)?);
    }
    if kind.includes(ExportKind::Inventory) {
        let rows = inventory_item::Entity::find()
            .filter(inventory_item::Column::BarbershopId.eq(barbershop_id))
            .order_by_asc(inventory_item::Column::Name)
            .all(db)
            .await?;
        data.insert("inventory".into(), to_values(rows)?);
    }
    Ok(Export { export_date: Utc::now(), date_range: range, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn sale_row(service: &str, amount: f64) -> sale::Model {
        let now = Utc::now();
        sale::Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::nil(),
            customer_name: "A".into(),
            service: service.into(),
            barber_name: "Ravi".into(),
            amount,
            payment_method: "UPI".into(),
            appointment_id: None,
            notes: String::new(),
            sale_date: d(3, 1),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn export_kind_rejects_unknown_types() {
        assert_eq!("sales".parse::<ExportKind>().unwrap(), ExportKind::Sales);
        assert!(matches!("payroll".parse::<ExportKind>(), Err(ServiceError::Validation(_))));
        assert!(ExportKind::All.includes(ExportKind::Inventory));
        assert!(!ExportKind::Sales.includes(ExportKind::Customers));
    }

    #[test]
    fn range_defaults_unless_both_bounds_given() {
        let default = DateRange::month_to_date(d(3, 20));
        assert_eq!(default.start, d(3, 1));
        assert_eq!(DateRange::or_default(Some(d(1, 5)), None, default).unwrap(), default);
        let explicit = DateRange::or_default(Some(d(1, 5)), Some(d(1, 9)), default).unwrap();
        assert_eq!(explicit, DateRange { start: d(1, 5), end: d(1, 9) });
        assert!(DateRange::or_default(Some(d(2, 1)), Some(d(1, 1)), default).is_err());
    }

    #[test]
    fn summary_of_empty_period_is_zero() {
        let range = DateRange { start: d(3, 1), end: d(3, 31) };
        let s = summarize(range, &[], &[]);
        assert_eq!(s.revenue.total, 0.0);
        assert_eq!(s.revenue.average, 0.0);
        assert_eq!(s.appointments.total, 0);
        assert!(s.services.is_empty());
    }

    #[test]
    fn service_performance_orders_by_revenue_with_average() {
        let rows = vec![sale_row("Cut", 100.0), sale_row("Cut", 150.0), sale_row("Color", 900.0)];
        let perf = service_performance(&rows);
        assert_eq!(perf[0].service, "Color");
        assert_eq!(perf[1], ServicePerformance { service: "Cut".into(), count: 2, revenue: 250.0, avg_price: 125.0 });
    }
}
