//! One-tap walk-in appointments and counter sales.

use chrono::{Local, Timelike};
use models::appointment::{self, AppointmentView};
use models::enums::{ActionType, AppointmentStatus, PaymentMethod};
use models::sale;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::appointments::{self, AppointmentInput};
use crate::customers;
use crate::errors::ServiceResult;
use crate::sales::{self, SaleInput};

pub const WALK_IN: &str = "Walk-in";

fn customer_or_walk_in(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).unwrap_or_else(|| WALK_IN.to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickAppointmentInput {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub service: String,
    pub barber_name: String,
}

/// Confirmed booking starting now, to the minute.
pub async fn appointment(db: &DatabaseConnection, barbershop_id: Uuid, input: QuickAppointmentInput) -> ServiceResult<AppointmentView> {
    let now = Local::now().naive_local();
    let time = now.time().with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now.time());
    let created = appointments::create_logged_as(
        db,
        barbershop_id,
        AppointmentInput {
            customer_name: customer_or_walk_in(input.customer_name),
            customer_phone: input.customer_phone.unwrap_or_default(),
            customer_email: None,
            service: input.service,
            barber_name: input.barber_name,
            appointment_date: now.date(),
            appointment_time: time,
            duration_minutes: None,
            status: Some(AppointmentStatus::Confirmed),
            notes: Some("Walk-in appointment".into()),
            amount: None,
        },
        ActionType::WalkInAppointment,
    )
    .await?;
    Ok(appointment::Model::view(created))
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickSaleInput {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub service: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    pub barber_name: String,
}

/// Record a sale dated today and refresh the matching customer's stats.
pub async fn sale(db: &DatabaseConnection, barbershop_id: Uuid, input: QuickSaleInput) -> ServiceResult<sale::Model> {
    let customer_name = customer_or_walk_in(input.customer_name);
    let created = sales::create_logged_as(
        db,
        barbershop_id,
        SaleInput {
            customer_name: customer_name.clone(),
            service: input.service,
            barber_name: input.barber_name,
            amount: input.amount,
            payment_method: input.payment_method.unwrap_or(PaymentMethod::Cash),
            appointment_id: None,
            notes: None,
            sale_date: Some(Local::now().date_naive()),
        },
        ActionType::QuickSale,
    )
    .await?;
    customers::refresh_stats_by_name(db, barbershop_id, &customer_name).await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::CustomerInput;
    use crate::test_support::{get_db, seed_barbershop};

    #[test]
    fn blank_names_become_walk_in() {
        assert_eq!(customer_or_walk_in(None), WALK_IN);
        assert_eq!(customer_or_walk_in(Some("  ".into())), WALK_IN);
        assert_eq!(customer_or_walk_in(Some(" Asha ".into())), "Asha");
    }

    #[tokio::test]
    async fn quick_sale_updates_known_customer() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;
        let asha = customers::create(
            &db,
            shop.id,
            CustomerInput { name: "Asha".into(), phone: "+919811111111".into(), email: None, notes: None },
        )
        .await?;

        let recorded = sale(
            &db,
            shop.id,
            QuickSaleInput { customer_name: Some("Asha".into()), service: "Cut".into(), amount: 300.0, payment_method: None, barber_name: "Ravi".into() },
        )
        .await?;
        assert_eq!(recorded.payment_method, "Cash");

        let refreshed = customers::get(&db, shop.id, asha.id).await?;
        assert_eq!(refreshed.total_spent, 300.0);
        Ok(())
    }

    #[tokio::test]
    async fn quick_sale_matches_customer_name_exactly() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;
        let asha = customers::create(
            &db,
            shop.id,
            CustomerInput { name: "Asha".into(), phone: "+919822222222".into(), email: None, notes: None },
        )
        .await?;

        sale(
            &db,
            shop.id,
            QuickSaleInput { customer_name: Some("asha".into()), service: "Cut".into(), amount: 300.0, payment_method: None, barber_name: "Ravi".into() },
        )
        .await?;
        let untouched = customers::get(&db, shop.id, asha.id).await?;
        assert_eq!(untouched.total_spent, 0.0);
        assert!(untouched.total_spent.is_sign_positive());

        sale(
            &db,
            shop.id,
            QuickSaleInput { customer_name: Some("Asha".into()), service: "Shave".into(), amount: 150.0, payment_method: None, barber_name: "Ravi".into() },
        )
        .await?;
        let refreshed = customers::get(&db, shop.id, asha.id).await?;
        assert_eq!(refreshed.total_spent, 150.0);
        Ok(())
    }
}
