//! Service layer for the barbershop platform.
//! - Business rules live here; entities and validation come from `models`.
//! - Barbershop operations take the tenant id and scope every query by it.
//! - Errors surface as `ServiceError` (or `AuthError` for the auth flow).

pub mod accounts;
pub mod activity;
pub mod admin;
pub mod appointments;
pub mod auth;
pub mod barbershops;
pub mod catalog;
pub mod customers;
pub mod dashboard;
pub mod errors;
pub mod inventory;
pub mod mailer;
pub mod pagination;
pub mod query;
pub mod quick;
pub mod reports;
pub mod sales;
pub mod schedule;
pub mod staff;
pub mod stats;
pub mod subscriptions;
pub mod super_admin;
#[cfg(test)]
pub mod test_support;
pub mod time_fmt;
