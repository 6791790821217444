//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user;
mod m20240301_000002_create_user_credentials;
mod m20240301_000003_create_email_verification_token;
mod m20240301_000004_create_password_reset_token;
mod m20240301_000005_create_token_blacklist;
mod m20240301_000006_create_login_history;
mod m20240301_000007_create_subscription;
mod m20240301_000008_create_subscription_history;
mod m20240301_000009_create_appointment;
mod m20240301_000010_create_sale;
mod m20240301_000011_create_staff;
mod m20240301_000012_create_staff_availability;
mod m20240301_000013_create_customer;
mod m20240301_000014_create_inventory_item;
mod m20240301_000015_create_shop_service;
mod m20240301_000016_create_activity_log;
mod m20240301_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user::Migration),
            Box::new(m20240301_000002_create_user_credentials::Migration),
            Box::new(m20240301_000003_create_email_verification_token::Migration),
            Box::new(m20240301_000004_create_password_reset_token::Migration),
            Box::new(m20240301_000005_create_token_blacklist::Migration),
            Box::new(m20240301_000006_create_login_history::Migration),
            Box::new(m20240301_000007_create_subscription::Migration),
            Box::new(m20240301_000008_create_subscription_history::Migration),
            Box::new(m20240301_000009_create_appointment::Migration),
            Box::new(m20240301_000010_create_sale::Migration),
            Box::new(m20240301_000011_create_staff::Migration),
            Box::new(m20240301_000012_create_staff_availability::Migration),
            Box::new(m20240301_000013_create_customer::Migration),
            Box::new(m20240301_000014_create_inventory_item::Migration),
            Box::new(m20240301_000015_create_shop_service::Migration),
            Box::new(m20240301_000016_create_activity_log::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000099_add_indexes::Migration),
        ]
    }
}
