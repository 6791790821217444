use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing::{error, info};

const USAGE: &str = "set SUPER_ADMIN_EMAIL and SUPER_ADMIN_PASSWORD (optionally SUPER_ADMIN_USERNAME, SUPER_ADMIN_FIRST_NAME, SUPER_ADMIN_LAST_NAME)";

async fn create() -> anyhow::Result<()> {
    let Some(seed) = server::startup::super_admin_seed(|key| std::env::var(key).ok()) else {
        anyhow::bail!(USAGE);
    };
    let cfg = configs::AppConfig::load()?;
    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None).await?;
    server::startup::bootstrap_super_admin(&db, seed).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    match create().await {
        Ok(()) => {
            info!(service = "barbershop-api", event = "create_super_admin_done", "super admin ready");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "barbershop-api", event = "create_super_admin_failed", error = %e, "could not create super admin");
            std::process::ExitCode::FAILURE
        }
    }
}
