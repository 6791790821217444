//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, token lifecycle and the email/password flows live here;
//! `repo` holds the database-backed repository.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::{AuthConfig, AuthService};
