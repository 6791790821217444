use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, LoginRecord, OneTimeToken, Registration};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use models::enums::{LoginStatus, Role};
use models::{email_verification_token, login_history, password_reset_token, token_blacklist, user, user_credentials};

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn repo_err(e: sea_orm::DbErr) -> AuthError {
    AuthError::Repository(e.to_string())
}

fn to_domain(u: user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        role: u.role.parse().unwrap_or(Role::Customer),
        is_deleted: u.is_deleted(),
        email: u.email,
        username: u.username,
        first_name: u.first_name,
        last_name: u.last_name,
        is_email_verified: u.is_email_verified,
        is_active: u.is_active,
    }
}

fn verification_token(t: email_verification_token::Model) -> OneTimeToken {
    OneTimeToken { id: t.id, user_id: t.user_id, token: t.token, is_used: t.is_used, expires_at: t.expires_at.with_timezone(&Utc) }
}

fn reset_token(t: password_reset_token::Model) -> OneTimeToken {
    OneTimeToken { id: t.id, user_id: t.user_id, token: t.token, is_used: t.is_used, expires_at: t.expires_at.with_timezone(&Utc) }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(user::find_by_email(&self.db, email).await?.map(to_domain))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let found = user::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        Ok(found.map(to_domain))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, AuthError> {
        Ok(user::username_taken(&self.db, username, None).await?)
    }

    async fn register_account(&self, registration: Registration) -> Result<(AuthUser, OneTimeToken), AuthError> {
        let Registration { account, password_hash, password_algorithm, verification_ttl, meta } = registration;
        let mut input = user::NewUser::new(&account.email, &account.username, account.role);
        input.first_name = account.first_name;
        input.last_name = account.last_name;
        input.phone = account.phone;

        let txn = self.db.begin().await.map_err(repo_err)?;
        let created = user::create(&txn, input).await?;
        user_credentials::set_password(&txn, created.id, password_hash, &password_algorithm).await?;
        let token = email_verification_token::issue(&txn, created.id, verification_ttl).await?;
        login_history::record(
            &txn,
            login_history::NewLoginAttempt {
                user_id: Some(created.id),
                email: created.email.clone(),
                ip_address: meta.ip_address,
                user_agent: meta.user_agent,
                status: LoginStatus::Success,
                failure_reason: None,
            },
        )
        .await?;
        txn.commit().await.map_err(repo_err)?;
        Ok((to_domain(created), verification_token(token)))
    }

    async fn mark_email_verified(&self, user_id: Uuid) -> Result<(), AuthError> {
        let found = user::Entity::find_by_id(user_id).one(&self.db).await.map_err(repo_err)?.ok_or(AuthError::NotFound)?;
        let mut am: user::ActiveModel = found.into();
        am.is_email_verified = Set(true);
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(repo_err)?;
        Ok(())
    }

    async fn touch_last_login(&self, user_id: Uuid, ip: Option<String>) -> Result<(), AuthError> {
        let found = user::Entity::find_by_id(user_id).one(&self.db).await.map_err(repo_err)?.ok_or(AuthError::NotFound)?;
        let mut am: user::ActiveModel = found.into();
        am.last_login_at = Set(Some(Utc::now().into()));
        am.last_login_ip = Set(ip);
        am.update(&self.db).await.map_err(repo_err)?;
        Ok(())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_for_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::set_password(&self.db, user_id, password_hash, &password_algorithm).await?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }

    async fn record_login(&self, record: LoginRecord) -> Result<(), AuthError> {
        login_history::record(
            &self.db,
            login_history::NewLoginAttempt {
                user_id: record.user_id,
                email: record.email,
                ip_address: record.meta.ip_address,
                user_agent: record.meta.user_agent,
                status: record.status,
                failure_reason: record.failure_reason,
            },
        )
        .await?;
        Ok(())
    }

    async fn issue_verification(&self, user_id: Uuid, ttl: chrono::Duration) -> Result<OneTimeToken, AuthError> {
        Ok(verification_token(email_verification_token::issue(&self.db, user_id, ttl).await?))
    }

    async fn find_verification(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError> {
        Ok(email_verification_token::find_by_token(&self.db, token).await?.map(verification_token))
    }

    async fn consume_verification(&self, id: Uuid) -> Result<(), AuthError> {
        Ok(email_verification_token::mark_used(&self.db, id).await?)
    }

    async fn revoke_verifications(&self, user_id: Uuid) -> Result<(), AuthError> {
        email_verification_token::revoke_all(&self.db, user_id).await?;
        Ok(())
    }

    async fn issue_reset(&self, user_id: Uuid, ttl: chrono::Duration, ip: Option<String>, user_agent: Option<String>) -> Result<OneTimeToken, AuthError> {
        Ok(reset_token(password_reset_token::issue(&self.db, user_id, ttl, ip, user_agent).await?))
    }

    async fn find_reset(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError> {
        Ok(password_reset_token::find_by_token(&self.db, token).await?.map(reset_token))
    }

    async fn consume_reset(&self, id: Uuid) -> Result<(), AuthError> {
        Ok(password_reset_token::mark_used(&self.db, id).await?)
    }

    async fn blacklist(&self, jti: Uuid, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        Ok(token_blacklist::insert(&self.db, jti, user_id, expires_at.into()).await?)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, AuthError> {
        Ok(token_blacklist::contains(&self.db, jti).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{ClientMeta, LoginInput, RegisterInput};
    use crate::auth::{AuthConfig, AuthService};
    use crate::test_support::get_db;
    use std::sync::Arc;

    #[tokio::test]
    async fn register_verify_login_against_postgres() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("db-test"));

        let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
        let email = format!("barber_{tag}@example.com");
        let reg = svc
            .register(
                RegisterInput {
                    email: email.clone(),
                    username: format!("barber_{tag}"),
                    first_name: "Db".into(),
                    last_name: "Test".into(),
                    phone: None,
                    role: Some(Role::Barber),
                    password: "Passw0rd!".into(),
                    password_confirm: "Passw0rd!".into(),
                },
                ClientMeta::default(),
            )
            .await?;

        let blocked = svc.login(LoginInput { email: email.clone(), password: "Passw0rd!".into() }, ClientMeta::default()).await;
        assert!(matches!(blocked, Err(AuthError::EmailNotVerified)));

        repo.mark_email_verified(reg.user_id).await?;
        let session = svc
            .login(LoginInput { email: email.clone(), password: "Passw0rd!".into() }, ClientMeta { ip_address: Some("10.0.0.1".into()), user_agent: None })
            .await?;
        svc.logout(&session.refresh).await?;
        assert!(svc.refresh(&session.refresh).await.is_err());

        let stored = user::Entity::find_by_id(reg.user_id).one(&db).await?.expect("user row");
        assert_eq!(stored.last_login_ip.as_deref(), Some("10.0.0.1"));
        user::hard_delete(&db, reg.user_id).await?;
        Ok(())
    }
}
