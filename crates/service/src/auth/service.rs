use std::sync::Arc;

use chrono::{Duration, Utc};
use models::enums::{LoginStatus, Role};
use models::validate;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    AuthSession, AuthUser, ClientMeta, LoginInput, LoginRecord, NewAccount, OneTimeToken, RegisterInput, RegisteredUser,
    Registration,
};
use super::errors::AuthError;
use super::password::{hash_password, verify_password, ALGORITHM};
use super::repository::AuthRepository;
use super::token::{Claims, TokenCodec, TokenType};
use crate::mailer::{self, LogMailer, Mailer};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
    pub frontend_url: String,
}

impl AuthConfig {
    pub fn from_settings(s: &configs::AuthSettings) -> Self {
        Self {
            jwt_secret: s.jwt_secret.clone(),
            password_algorithm: ALGORITHM.into(),
            access_ttl: Duration::minutes(s.access_token_minutes),
            refresh_ttl: Duration::days(s.refresh_token_days),
            verification_ttl: Duration::hours(s.email_verification_hours),
            reset_ttl: Duration::hours(s.password_reset_hours),
            frontend_url: s.frontend_url.clone(),
        }
    }

    /// Default lifetimes with the given signing secret.
    pub fn with_secret(secret: &str) -> Self {
        Self::from_settings(&configs::AuthSettings { jwt_secret: secret.into(), ..Default::default() })
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenCodec,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, mailer: Arc::new(LogMailer), tokens: TokenCodec::new(cfg.jwt_secret.clone()), cfg }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    async fn send_mail(&self, mail: mailer::Mail) {
        if let Err(e) = self.mailer.send(mail).await {
            warn!(error = %e, "mail delivery failed");
        }
    }

    async fn send_verification(&self, user: &AuthUser) -> Result<(), AuthError> {
        let token = self.repo.issue_verification(user.id, self.cfg.verification_ttl).await?;
        self.mail_verification(user, &token).await;
        Ok(())
    }

    async fn mail_verification(&self, user: &AuthUser, token: &OneTimeToken) {
        let link = format!("{}/verify-email?token={}", self.cfg.frontend_url, token.token);
        let hours = self.cfg.verification_ttl.num_hours();
        self.send_mail(mailer::verification_mail(&user.email, &user.full_name(), &link, hours)).await;
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{ClientMeta, RegisterInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::with_secret("secret"));
    /// let input = RegisterInput {
    ///     email: "User@Example.com".into(), username: "user_1".into(),
    ///     first_name: "Test".into(), last_name: "User".into(), phone: None, role: None,
    ///     password: "Secret123".into(), password_confirm: "Secret123".into(),
    /// };
    /// let user = tokio_test::block_on(svc.register(input, ClientMeta::default())).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input, meta), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput, meta: ClientMeta) -> Result<RegisteredUser, AuthError> {
        validate::password_pair(&input.password, &input.password_confirm)?;
        let email = validate::normalize_email(&input.email)?;
        validate::validate_username(&input.username)?;
        let phone = input.phone.filter(|p| !p.trim().is_empty());
        if let Some(p) = &phone {
            validate::validate_phone(p)?;
        }
        let role = input.role.unwrap_or(Role::Customer);
        if !matches!(role, Role::Customer | Role::Barber) {
            return Err(AuthError::Validation(format!("role '{}' cannot self-register", role)));
        }
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict("a user with this email already exists".into()));
        }
        if self.repo.username_taken(&input.username).await? {
            return Err(AuthError::Conflict("a user with this username already exists".into()));
        }

        let password_hash = hash_password(&input.password)?;
        let (user, token) = self
            .repo
            .register_account(Registration {
                account: NewAccount {
                    email,
                    username: input.username,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    phone,
                    role,
                },
                password_hash,
                password_algorithm: self.cfg.password_algorithm.clone(),
                verification_ttl: self.cfg.verification_ttl,
                meta,
            })
            .await?;
        self.mail_verification(&user, &token).await;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(RegisteredUser { user_id: user.id, email: user.email, username: user.username })
    }

    async fn reject_login(
        &self,
        user_id: Option<Uuid>,
        email: &str,
        meta: &ClientMeta,
        status: LoginStatus,
        reason: &str,
        err: AuthError,
    ) -> Result<AuthSession, AuthError> {
        self.repo
            .record_login(LoginRecord {
                user_id,
                email: email.to_string(),
                meta: meta.clone(),
                status,
                failure_reason: Some(reason.to_string()),
            })
            .await?;
        warn!(email = %email, reason = reason, "login_rejected");
        Err(err)
    }

    /// Authenticate a user and issue an access/refresh pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{ClientMeta, LoginInput, RegisterInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("secret"));
    /// let reg = tokio_test::block_on(svc.register(RegisterInput {
    ///     email: "u@e.com".into(), username: "u_e".into(), first_name: "U".into(), last_name: "E".into(),
    ///     phone: None, role: None, password: "Passw0rd".into(), password_confirm: "Passw0rd".into(),
    /// }, ClientMeta::default())).unwrap();
    /// repo.update_user(reg.user_id, |u| u.is_email_verified = true);
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() }, ClientMeta::default())).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.access.is_empty());
    /// ```
    #[instrument(skip(self, input, meta), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput, meta: ClientMeta) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_lowercase();
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            return self.reject_login(None, &email, &meta, LoginStatus::Failed, "unknown email", AuthError::Unauthorized).await;
        };
        let verified = match self.repo.get_credentials(user.id).await? {
            Some(cred) => verify_password(&input.password, &cred.password_hash)?,
            None => false,
        };
        if !verified {
            return self.reject_login(Some(user.id), &email, &meta, LoginStatus::Failed, "wrong password", AuthError::Unauthorized).await;
        }
        if !user.is_active || user.is_deleted {
            return self.reject_login(Some(user.id), &email, &meta, LoginStatus::Blocked, "account disabled", AuthError::Inactive).await;
        }
        if !user.is_email_verified {
            return self
                .reject_login(Some(user.id), &email, &meta, LoginStatus::Blocked, "email not verified", AuthError::EmailNotVerified)
                .await;
        }

        self.repo.touch_last_login(user.id, meta.ip_address.clone()).await?;
        self.repo
            .record_login(LoginRecord { user_id: Some(user.id), email: email.clone(), meta, status: LoginStatus::Success, failure_reason: None })
            .await?;
        let access = self.tokens.issue(&user, TokenType::Access, self.cfg.access_ttl)?;
        let refresh = self.tokens.issue(&user, TokenType::Refresh, self.cfg.refresh_ttl)?;
        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { access, refresh, user: user.summary() })
    }

    /// Exchange a refresh token for a new access token.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.decode(refresh_token, TokenType::Refresh)?;
        if self.repo.is_blacklisted(claims.jti).await? {
            return Err(AuthError::InvalidToken);
        }
        let user = self.repo.find_user_by_id(claims.uid).await?.ok_or(AuthError::InvalidToken)?;
        if !user.is_active || user.is_deleted {
            return Err(AuthError::Inactive);
        }
        self.tokens.issue(&user, TokenType::Access, self.cfg.access_ttl)
    }

    /// Revoke a refresh token until it would have expired anyway.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.tokens.decode(refresh_token, TokenType::Refresh)?;
        self.repo.blacklist(claims.jti, claims.uid, claims.expires_at()).await?;
        info!(user_id = %claims.uid, "user_logged_out");
        Ok(())
    }

    /// Validate an access token presented on a request.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.tokens.decode(access_token, TokenType::Access)
    }

    #[instrument(skip(self))]
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let invalid = || AuthError::Validation("invalid verification token".into());
        let token = Uuid::parse_str(token.trim()).map_err(|_| invalid())?;
        let found = self.repo.find_verification(token).await?.ok_or_else(invalid)?;
        if found.is_used {
            return Err(AuthError::Validation("verification token has already been used".into()));
        }
        if !found.is_valid_at(Utc::now()) {
            return Err(AuthError::Validation("verification token has expired".into()));
        }
        self.repo.consume_verification(found.id).await?;
        self.repo.mark_email_verified(found.user_id).await?;
        info!(user_id = %found.user_id, "email_verified");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        let user = self.repo.find_user_by_email(&email).await?.ok_or(AuthError::NotFound)?;
        if user.is_email_verified {
            return Err(AuthError::Validation("email is already verified".into()));
        }
        self.repo.revoke_verifications(user.id).await?;
        self.send_verification(&user).await
    }

    #[instrument(skip(self, old_password, new_password, new_password_confirm))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> Result<(), AuthError> {
        let cred = self.repo.get_credentials(user_id).await?.ok_or(AuthError::NotFound)?;
        if !verify_password(old_password, &cred.password_hash)? {
            return Err(AuthError::Validation("old password is incorrect".into()));
        }
        validate::password_pair(new_password, new_password_confirm)?;
        let hash = hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user_id, "password_changed");
        Ok(())
    }

    /// Always succeeds so callers cannot probe which emails are registered.
    #[instrument(skip(self, meta))]
    pub async fn request_password_reset(&self, email: &str, meta: ClientMeta) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            debug!("password reset for unknown email");
            return Ok(());
        };
        if !user.is_active || user.is_deleted {
            return Ok(());
        }
        let token = self.repo.issue_reset(user.id, self.cfg.reset_ttl, meta.ip_address, meta.user_agent).await?;
        let link = format!("{}/reset-password?token={}", self.cfg.frontend_url, token.token);
        let hours = self.cfg.reset_ttl.num_hours();
        self.send_mail(mailer::password_reset_mail(&user.email, &user.full_name(), &link, hours)).await;
        info!(user_id = %user.id, "password_reset_requested");
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str, new_password_confirm: &str) -> Result<(), AuthError> {
        validate::password_pair(new_password, new_password_confirm)?;
        let invalid = || AuthError::Validation("invalid or expired reset token".into());
        let token = Uuid::parse_str(token.trim()).map_err(|_| invalid())?;
        let found = self.repo.find_reset(token).await?.ok_or_else(invalid)?;
        if !found.is_valid_at(Utc::now()) {
            return Err(invalid());
        }
        let hash = hash_password(new_password)?;
        self.repo.upsert_password(found.user_id, hash, self.cfg.password_algorithm.clone()).await?;
        self.repo.consume_reset(found.id).await?;
        info!(user_id = %found.user_id, "password_reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::mailer::MemoryMailer;

    struct Harness {
        repo: Arc<MockAuthRepository>,
        mail: Arc<MemoryMailer>,
        svc: AuthService<MockAuthRepository>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(MockAuthRepository::default());
        let mail = Arc::new(MemoryMailer::default());
        let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("test-secret")).with_mailer(mail.clone());
        Harness { repo, mail, svc }
    }

    fn input(email: &str, username: &str) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            username: username.into(),
            first_name: "Ravi".into(),
            last_name: "Kumar".into(),
            phone: Some("+919876543210".into()),
            role: None,
            password: "Passw0rd!".into(),
            password_confirm: "Passw0rd!".into(),
        }
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn register_validates_and_mails_verification() {
        let h = harness();
        let mut bad = input("a@b.com", "ab_1");
        bad.password_confirm = "different".into();
        assert!(matches!(h.svc.register(bad, ClientMeta::default()).await, Err(AuthError::Validation(_))));

        let mut admin = input("a@b.com", "ab_1");
        admin.role = Some(Role::Admin);
        assert!(matches!(h.svc.register(admin, ClientMeta::default()).await, Err(AuthError::Validation(_))));

        let reg = h.svc.register(input("A@B.com", "ab_1"), ClientMeta::default()).await.unwrap();
        assert_eq!(reg.email, "a@b.com");
        let mails = h.mail.sent();
        assert_eq!(mails.len(), 1);
        let token = h.repo.pending_verification(reg.user_id).unwrap();
        assert!(mails[0].body.contains(&token.token.to_string()));

        let dup = h.svc.register(input("a@b.com", "other"), ClientMeta::default()).await;
        assert!(matches!(dup, Err(AuthError::Conflict(_))));
        let dup_name = h.svc.register(input("c@b.com", "ab_1"), ClientMeta::default()).await;
        assert!(matches!(dup_name, Err(AuthError::Conflict(_))));
    }

    #[tokio::test]
    async fn failed_registration_leaves_nothing_behind() {
        let h = harness();
        h.repo.fail_verification.store(true, std::sync::atomic::Ordering::SeqCst);
        let failed = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await;
        assert!(matches!(failed, Err(AuthError::Repository(_))));
        assert!(h.mail.sent().is_empty());
        assert!(h.repo.logins.lock().unwrap().is_empty());

        let retried = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        assert!(h.repo.pending_verification(retried.user_id).is_some());
        assert_eq!(h.mail.sent().len(), 1);
    }

    #[tokio::test]
    async fn login_requires_verified_email() {
        let h = harness();
        let reg = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        let err = h.svc.login(login("a@b.com", "Passw0rd!"), ClientMeta::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailNotVerified));

        let token = h.repo.pending_verification(reg.user_id).unwrap();
        h.svc.verify_email(&token.token.to_string()).await.unwrap();
        let again = h.svc.verify_email(&token.token.to_string()).await;
        assert!(matches!(again, Err(AuthError::Validation(_))));

        let session = h.svc.login(login(" A@B.COM ", "Passw0rd!"), ClientMeta::default()).await.unwrap();
        assert_eq!(session.user.full_name, "Ravi Kumar");
        let claims = h.svc.authenticate(&session.access).unwrap();
        assert_eq!(claims.uid, reg.user_id);
    }

    #[tokio::test]
    async fn wrong_password_and_disabled_accounts_are_rejected() {
        let h = harness();
        let reg = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        h.repo.update_user(reg.user_id, |u| u.is_email_verified = true);

        let err = h.svc.login(login("a@b.com", "nope"), ClientMeta::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        let err = h.svc.login(login("ghost@b.com", "Passw0rd!"), ClientMeta::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        h.repo.update_user(reg.user_id, |u| u.is_active = false);
        let err = h.svc.login(login("a@b.com", "Passw0rd!"), ClientMeta::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::Inactive));

        let logins = h.repo.logins.lock().unwrap();
        let failed = logins.iter().filter(|l| l.status == LoginStatus::Failed).count();
        assert_eq!(failed, 2);
    }

    #[tokio::test]
    async fn refresh_then_logout_revokes_refresh_token() {
        let h = harness();
        let reg = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        h.repo.update_user(reg.user_id, |u| u.is_email_verified = true);
        let session = h.svc.login(login("a@b.com", "Passw0rd!"), ClientMeta::default()).await.unwrap();

        let access = h.svc.refresh(&session.refresh).await.unwrap();
        assert!(h.svc.authenticate(&access).is_ok());
        assert!(matches!(h.svc.refresh(&session.access).await, Err(AuthError::InvalidToken)));

        h.svc.logout(&session.refresh).await.unwrap();
        assert!(matches!(h.svc.refresh(&session.refresh).await, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn resend_verification_rotates_tokens() {
        let h = harness();
        let reg = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        let first = h.repo.pending_verification(reg.user_id).unwrap();
        h.svc.resend_verification("a@b.com").await.unwrap();
        let second = h.repo.pending_verification(reg.user_id).unwrap();
        assert_ne!(first.token, second.token);
        assert!(h.svc.verify_email(&first.token.to_string()).await.is_err());
        h.svc.verify_email(&second.token.to_string()).await.unwrap();

        assert!(matches!(h.svc.resend_verification("a@b.com").await, Err(AuthError::Validation(_))));
        assert!(matches!(h.svc.resend_verification("x@b.com").await, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn password_change_and_reset() {
        let h = harness();
        let reg = h.svc.register(input("a@b.com", "ab_1"), ClientMeta::default()).await.unwrap();
        h.repo.update_user(reg.user_id, |u| u.is_email_verified = true);

        let wrong_old = h.svc.change_password(reg.user_id, "bad", "NewPassw0rd", "NewPassw0rd").await;
        assert!(matches!(wrong_old, Err(AuthError::Validation(_))));
        h.svc.change_password(reg.user_id, "Passw0rd!", "NewPassw0rd", "NewPassw0rd").await.unwrap();
        assert!(h.svc.login(login("a@b.com", "NewPassw0rd"), ClientMeta::default()).await.is_ok());

        h.svc.request_password_reset("nobody@b.com", ClientMeta::default()).await.unwrap();
        assert_eq!(h.mail.sent().len(), 1);
        h.svc.request_password_reset("a@b.com", ClientMeta::default()).await.unwrap();
        assert_eq!(h.mail.sent().len(), 2);

        let token = h.repo.pending_reset(reg.user_id).unwrap().token.to_string();
        h.svc.reset_password(&token, "Reset1234", "Reset1234").await.unwrap();
        assert!(h.svc.reset_password(&token, "Reset1234", "Reset1234").await.is_err());
        assert!(h.svc.login(login("a@b.com", "Reset1234"), ClientMeta::default()).await.is_ok());
    }
}
