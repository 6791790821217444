pub mod errors;
pub mod db;
pub mod enums;
pub mod validate;

pub mod user;
pub mod user_credentials;
pub mod email_verification_token;
pub mod password_reset_token;
pub mod token_blacklist;
pub mod login_history;

pub mod subscription;
pub mod subscription_history;

pub mod appointment;
pub mod sale;
pub mod staff;
pub mod staff_availability;
pub mod customer;
pub mod inventory_item;
pub mod shop_service;
pub mod activity_log;

#[cfg(test)]
mod db_tests {
    use migration::MigratorTrait;
    use sea_orm::{EntityTrait, TransactionTrait};

    use crate::enums::{ActionType, Role, SubscriptionPlan};
    use crate::{activity_log, db, subscription, user};

    #[tokio::test]
    async fn barbershop_lifecycle_round_trip() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let conn = db::connect().await?;
        migration::Migrator::up(&conn, None).await?;
        let txn = conn.begin().await?;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let mut input = user::NewUser::new(&format!("Shop{}@Example.com", &suffix[..8]), &format!("shop_{}", &suffix[..8]), Role::Barbershop);
        input.shop_name = Some("Fade Factory".into());
        let shop = user::create(&txn, input).await?;
        assert_eq!(shop.email, format!("shop{}@example.com", &suffix[..8]));

        let sub = subscription::create(&txn, shop.id, SubscriptionPlan::Basic).await?;
        assert_eq!(sub.days_remaining(), subscription::DEFAULT_TERM_DAYS - 1);

        let entry = activity_log::NewActivity::new(shop.id, ActionType::SettingsChanged, "created");
        let logged = activity_log::record(&txn, entry).await?;
        assert_eq!(logged.action_type, "settings_changed");

        let archived = user::soft_delete(&txn, shop.id, None).await?;
        assert!(archived.is_deleted() && !archived.is_active);
        let restored = user::restore(&txn, shop.id).await?;
        assert!(restored.can_sign_in());

        user::hard_delete(&txn, shop.id).await?;
        assert!(user::Entity::find_by_id(shop.id).one(&txn).await?.is_none());
        txn.rollback().await?;
        Ok(())
    }
}
