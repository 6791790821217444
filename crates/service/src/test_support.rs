#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, resolve_config};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let mut cfg = resolve_config();
            cfg.min_connections = 1;
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            drop(db);
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Return a fresh connection for the current test's runtime
    let mut cfg = resolve_config();
    cfg.max_connections = cfg.max_connections.max(20);
    cfg.min_connections = 1;
    cfg.acquire_timeout_secs = 10;
    connect_with_config(&cfg).await
}

fn unique_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Fresh verified user with the given role.
pub async fn seed_user(db: &DatabaseConnection, role: models::enums::Role) -> Result<models::user::Model, anyhow::Error> {
    let tag = unique_tag();
    let mut input = models::user::NewUser::new(&format!("{}_{tag}@example.com", role.as_str()), &format!("{}_{tag}", role.as_str()), role);
    input.is_email_verified = true;
    if role == models::enums::Role::Barbershop {
        input.shop_name = Some(format!("Shop {tag}"));
        input.shop_owner_name = Some("Owner".into());
    }
    Ok(models::user::create(db, input).await?)
}

pub async fn seed_barbershop(db: &DatabaseConnection) -> Result<models::user::Model, anyhow::Error> {
    seed_user(db, models::enums::Role::Barbershop).await
}
