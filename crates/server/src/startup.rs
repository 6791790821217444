use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use service::accounts::{self, SuperAdminSeed};
use service::auth::AuthConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Super admin settings from `SUPER_ADMIN_EMAIL` and `SUPER_ADMIN_PASSWORD`,
/// with optional `SUPER_ADMIN_USERNAME`, `SUPER_ADMIN_FIRST_NAME` and `SUPER_ADMIN_LAST_NAME`.
/// `None` unless both required values are set.
pub fn super_admin_seed(var: impl Fn(&str) -> Option<String>) -> Option<SuperAdminSeed> {
    let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    Some(SuperAdminSeed {
        email: get("SUPER_ADMIN_EMAIL")?,
        password: var("SUPER_ADMIN_PASSWORD").filter(|v| !v.is_empty())?,
        username: get("SUPER_ADMIN_USERNAME"),
        first_name: get("SUPER_ADMIN_FIRST_NAME").unwrap_or_else(|| "Super".into()),
        last_name: get("SUPER_ADMIN_LAST_NAME").unwrap_or_else(|| "Admin".into()),
    })
}

/// Create or promote the super admin described by `seed`.
pub async fn bootstrap_super_admin(db: &DatabaseConnection, seed: SuperAdminSeed) -> Result<(), StartupError> {
    let email = seed.email.clone();
    let (account, created) = accounts::ensure_super_admin(db, seed)
        .await
        .map_err(|e| StartupError::Bootstrap(e.to_string()))?;
    info!(event = "super_admin_ready", user_id = %account.id, %email, created, "super admin account ready");
    Ok(())
}

/// Build the router for an already connected state. Used by `run` and the integration tests.
pub fn app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: load config, connect, migrate and serve until the listener fails.
pub async fn run() -> Result<(), StartupError> {
    let cfg = AppConfig::load().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    info!(event = "migrations_applied", "database schema up to date");

    if let Some(seed) = super_admin_seed(|key| std::env::var(key).ok()) {
        bootstrap_super_admin(&db, seed).await?;
    }

    let state = ServerState::new(db, AuthConfig::from_settings(&cfg.auth));
    let app = app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting barbershop api");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparsable_host() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        cfg.server.port = 8080;
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }

    #[test]
    fn parses_default_bind_address() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 8081;
        assert_eq!(bind_addr(&cfg).unwrap().port(), 8081);
    }

    #[test]
    fn super_admin_seed_needs_email_and_password() {
        let vars = |pairs: &'static [(&'static str, &'static str)]| {
            move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        };
        assert!(super_admin_seed(vars(&[("SUPER_ADMIN_EMAIL", "root@example.com")])).is_none());
        assert!(super_admin_seed(vars(&[("SUPER_ADMIN_EMAIL", "  "), ("SUPER_ADMIN_PASSWORD", "R00tPassw0rd")])).is_none());

        let seed = super_admin_seed(vars(&[
            ("SUPER_ADMIN_EMAIL", " root@example.com "),
            ("SUPER_ADMIN_PASSWORD", "R00tPassw0rd"),
            ("SUPER_ADMIN_LAST_NAME", "Owner"),
        ]))
        .unwrap();
        assert_eq!(seed.email, "root@example.com");
        assert_eq!(seed.username, None);
        assert_eq!((seed.first_name.as_str(), seed.last_name.as_str()), ("Super", "Owner"));
    }
}
