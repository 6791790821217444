pub mod auth;
pub mod errors;
pub mod extract;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod startup;

pub use startup::{app, run};
