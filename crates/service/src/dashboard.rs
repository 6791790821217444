//! Barbershop dashboard figures.

use chrono::{Datelike, Local, NaiveDate};
use models::enums::{AppointmentStatus, StaffStatus};
use models::{appointment, customer, sale, staff};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ServiceResult;
use crate::inventory;
use crate::stats::{self, Bucket};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub today_appointments: u64,
    pub pending_appointments: u64,
    pub completed_appointments: u64,
    pub cancelled_appointments: u64,
    pub today_sales: f64,
    pub total_sales: f64,
    pub active_staff: u64,
    pub total_customers: u64,
    pub low_stock_items: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
    pub appointments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePopularity {
    pub service: String,
    pub count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffPerformance {
    pub barber_name: String,
    pub services_count: u64,
    pub revenue: f64,
}

fn appointments_of(barbershop_id: Uuid) -> sea_orm::Select<appointment::Entity> {
    appointment::Entity::find().filter(appointment::Column::BarbershopId.eq(barbershop_id))
}

/// `(sale_date, amount)` for the tenant's sales from `since` onwards, or all of them.
pub async fn sale_amounts<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, since: Option<NaiveDate>) -> ServiceResult<Vec<(NaiveDate, f64)>> {
    let mut q = sale::Entity::find()
        .select_only()
        .column(sale::Column::SaleDate)
        .column(sale::Column::Amount)
        .filter(sale::Column::BarbershopId.eq(barbershop_id));
    if let Some(d) = since {
        q = q.filter(sale::Column::SaleDate.gte(d));
    }
    Ok(q.into_tuple().all(db).await?)
}

pub async fn stats(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<DashboardStats> {
    let today = Local::now().date_naive();
    let on_today = |status: Option<AppointmentStatus>| {
        let q = appointments_of(barbershop_id).filter(appointment::Column::AppointmentDate.eq(today));
        match status {
            Some(s) => q.filter(appointment::Column::Status.eq(s.as_str())),
            None => q,
        }
    };
    let all_sales = sale_amounts(db, barbershop_id, None).await?;
    Ok(DashboardStats {
        today_appointments: on_today(None).count(db).await?,
        pending_appointments: appointments_of(barbershop_id)
            .filter(appointment::Column::Status.eq(AppointmentStatus::Pending.as_str()))
            .count(db)
            .await?,
        completed_appointments: on_today(Some(AppointmentStatus::Completed)).count(db).await?,
        cancelled_appointments: on_today(Some(AppointmentStatus::Cancelled)).count(db).await?,
        today_sales: stats::sum(all_sales.iter().filter(|(d, _)| *d == today).map(|(_, a)| *a)),
        total_sales: stats::sum(all_sales.iter().map(|(_, a)| *a)),
        active_staff: staff::Entity::find()
            .filter(staff::Column::BarbershopId.eq(barbershop_id))
            .filter(staff::Column::Status.eq(StaffStatus::Active.as_str()))
            .count(db)
            .await?,
        total_customers: customer::Entity::find()
            .filter(customer::Column::BarbershopId.eq(barbershop_id))
            .count(db)
            .await?,
        low_stock_items: inventory::low_stock_count(db, barbershop_id).await?,
    })
}

/// Fold dated sales and completed-appointment dates into the given months.
pub fn monthly_breakdown(months: &[(i32, u32)], sales: &[(NaiveDate, f64)], completed: &[NaiveDate]) -> Vec<MonthlyRevenue> {
    months
        .iter()
        .map(|&(y, m)| {
            let in_month = |d: &NaiveDate| d.year() == y && d.month() == m;
            MonthlyRevenue {
                month: stats::month_label(y, m),
                revenue: stats::sum(sales.iter().filter(|(d, _)| in_month(d)).map(|(_, a)| *a)),
                appointments: completed.iter().filter(|d| in_month(d)).count() as u64,
            }
        })
        .collect()
}

pub async fn monthly_revenue(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<MonthlyRevenue>> {
    let months = stats::trailing_months(Local::now().date_naive(), 12);
    let Some(since) = months.first().and_then(|&(y, m)| stats::month_start(y, m)) else {
        return Ok(Vec::new());
    };
    let sales = sale_amounts(db, barbershop_id, Some(since)).await?;
    let completed: Vec<NaiveDate> = appointments_of(barbershop_id)
        .select_only()
        .column(appointment::Column::AppointmentDate)
        .filter(appointment::Column::Status.eq(AppointmentStatus::Completed.as_str()))
        .filter(appointment::Column::AppointmentDate.gte(since))
        .into_tuple()
        .all(db)
        .await?;
    Ok(monthly_breakdown(&months, &sales, &completed))
}

async fn all_sales(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<sale::Model>> {
    Ok(sale::Entity::find().filter(sale::Column::BarbershopId.eq(barbershop_id)).all(db).await?)
}

pub fn popularity(rows: &[sale::Model]) -> Vec<ServicePopularity> {
    let mut buckets = stats::group(rows, |s| s.service.clone(), |s| s.amount);
    stats::sort_by_count_desc(&mut buckets);
    buckets
        .into_iter()
        .map(|Bucket { key, count, total }| ServicePopularity { service: key, count, revenue: total })
        .collect()
}

pub fn performance(rows: &[sale::Model]) -> Vec<StaffPerformance> {
    let mut buckets = stats::group(rows, |s| s.barber_name.clone(), |s| s.amount);
    stats::sort_by_total_desc(&mut buckets);
    buckets
        .into_iter()
        .map(|Bucket { key, count, total }| StaffPerformance { barber_name: key, services_count: count, revenue: total })
        .collect()
}

pub async fn service_popularity(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<ServicePopularity>> {
    Ok(popularity(&all_sales(db, barbershop_id).await?))
}

pub async fn staff_performance(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<StaffPerformance>> {
    Ok(performance(&all_sales(db, barbershop_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sale_row(service: &str, barber: &str, amount: f64) -> sale::Model {
        let now = Utc::now();
        sale::Model {
            id: Uuid::new_v4(),
            barbershop_id: Uuid::nil(),
            customer_name: "Walk-in".into(),
            service: service.into(),
            barber_name: barber.into(),
            amount,
            payment_method: "Cash".into(),
            appointment_id: None,
            notes: String::new(),
            sale_date: now.date_naive(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn months_without_activity_are_zero() {
        let months = stats::trailing_months(d(2024, 3, 15), 3);
        let out = monthly_breakdown(&months, &[(d(2024, 2, 3), 100.0), (d(2024, 2, 20), 50.5)], &[d(2024, 3, 1)]);
        assert_eq!(
            out,
            vec![
                MonthlyRevenue { month: "Jan 2024".into(), revenue: 0.0, appointments: 0 },
                MonthlyRevenue { month: "Feb 2024".into(), revenue: 150.5, appointments: 0 },
                MonthlyRevenue { month: "Mar 2024".into(), revenue: 0.0, appointments: 1 },
            ]
        );
    }

    #[test]
    fn popularity_by_count_and_performance_by_revenue() {
        let rows = vec![
            sale_row("Cut", "Ravi", 100.0),
            sale_row("Shave", "Amit", 400.0),
            sale_row("Cut", "Ravi", 100.0),
        ];
        let pop = popularity(&rows);
        assert_eq!(pop[0], ServicePopularity { service: "Cut".into(), count: 2, revenue: 200.0 });
        let perf = performance(&rows);
        assert_eq!(perf[0], StaffPerformance { barber_name: "Amit".into(), services_count: 1, revenue: 400.0 });
    }
}
