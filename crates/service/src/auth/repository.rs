use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, LoginRecord, OneTimeToken, Registration};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn username_taken(&self, username: &str) -> Result<bool, AuthError>;
    /// Insert the user, credentials, verification token and login entry atomically.
    async fn register_account(&self, registration: Registration) -> Result<(AuthUser, OneTimeToken), AuthError>;
    async fn mark_email_verified(&self, user_id: Uuid) -> Result<(), AuthError>;
    async fn touch_last_login(&self, user_id: Uuid, ip: Option<String>) -> Result<(), AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    async fn record_login(&self, record: LoginRecord) -> Result<(), AuthError>;

    async fn issue_verification(&self, user_id: Uuid, ttl: chrono::Duration) -> Result<OneTimeToken, AuthError>;
    async fn find_verification(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError>;
    async fn consume_verification(&self, id: Uuid) -> Result<(), AuthError>;
    async fn revoke_verifications(&self, user_id: Uuid) -> Result<(), AuthError>;

    async fn issue_reset(&self, user_id: Uuid, ttl: chrono::Duration, ip: Option<String>, user_agent: Option<String>) -> Result<OneTimeToken, AuthError>;
    async fn find_reset(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError>;
    async fn consume_reset(&self, id: Uuid) -> Result<(), AuthError>;

    async fn blacklist(&self, jti: Uuid, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AuthError>;
    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use models::enums::LoginStatus;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>,
        verifications: Mutex<HashMap<Uuid, OneTimeToken>>,
        resets: Mutex<HashMap<Uuid, OneTimeToken>>,
        blacklisted: Mutex<HashSet<Uuid>>,
        pub logins: Mutex<Vec<LoginRecord>>,
        /// Make the next registration fail while storing its verification token.
        pub fail_verification: AtomicBool,
    }

    impl MockAuthRepository {
        /// Flip flags directly, bypassing the service.
        pub fn update_user(&self, id: Uuid, f: impl FnOnce(&mut AuthUser)) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&id) {
                f(u);
            }
        }

        /// Latest outstanding verification token for a user.
        pub fn pending_verification(&self, user_id: Uuid) -> Option<OneTimeToken> {
            self.verifications
                .lock()
                .unwrap()
                .values()
                .filter(|t| t.user_id == user_id && !t.is_used)
                .max_by_key(|t| t.expires_at)
                .cloned()
        }

        pub fn pending_reset(&self, user_id: Uuid) -> Option<OneTimeToken> {
            self.resets
                .lock()
                .unwrap()
                .values()
                .filter(|t| t.user_id == user_id && !t.is_used)
                .max_by_key(|t| t.expires_at)
                .cloned()
        }

        fn new_token(user_id: Uuid, ttl: chrono::Duration) -> OneTimeToken {
            OneTimeToken { id: Uuid::new_v4(), user_id, token: Uuid::new_v4(), is_used: false, expires_at: Utc::now() + ttl }
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn username_taken(&self, username: &str) -> Result<bool, AuthError> {
            Ok(self.users.lock().unwrap().values().any(|u| u.username == username))
        }

        async fn register_account(&self, registration: Registration) -> Result<(AuthUser, OneTimeToken), AuthError> {
            let Registration { account, password_hash, password_algorithm, verification_ttl, meta } = registration;
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == account.email) {
                return Err(AuthError::Conflict("email already registered".into()));
            }
            if self.fail_verification.swap(false, Ordering::SeqCst) {
                return Err(AuthError::Repository("verification token store unavailable".into()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: account.email,
                username: account.username,
                first_name: account.first_name,
                last_name: account.last_name,
                role: account.role,
                is_email_verified: false,
                is_active: true,
                is_deleted: false,
            };
            let token = Self::new_token(user.id, verification_ttl);
            users.insert(user.id, user.clone());
            self.creds.lock().unwrap().insert(user.id, Credentials { user_id: user.id, password_hash, password_algorithm });
            self.verifications.lock().unwrap().insert(token.token, token.clone());
            self.logins.lock().unwrap().push(LoginRecord {
                user_id: Some(user.id),
                email: user.email.clone(),
                meta,
                status: LoginStatus::Success,
                failure_reason: None,
            });
            Ok((user, token))
        }

        async fn mark_email_verified(&self, user_id: Uuid) -> Result<(), AuthError> {
            self.update_user(user_id, |u| u.is_email_verified = true);
            Ok(())
        }

        async fn touch_last_login(&self, _user_id: Uuid, _ip: Option<String>) -> Result<(), AuthError> {
            Ok(())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn record_login(&self, record: LoginRecord) -> Result<(), AuthError> {
            self.logins.lock().unwrap().push(record);
            Ok(())
        }

        async fn issue_verification(&self, user_id: Uuid, ttl: chrono::Duration) -> Result<OneTimeToken, AuthError> {
            let t = Self::new_token(user_id, ttl);
            self.verifications.lock().unwrap().insert(t.token, t.clone());
            Ok(t)
        }

        async fn find_verification(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError> {
            Ok(self.verifications.lock().unwrap().get(&token).cloned())
        }

        async fn consume_verification(&self, id: Uuid) -> Result<(), AuthError> {
            for t in self.verifications.lock().unwrap().values_mut().filter(|t| t.id == id) {
                t.is_used = true;
            }
            Ok(())
        }

        async fn revoke_verifications(&self, user_id: Uuid) -> Result<(), AuthError> {
            for t in self.verifications.lock().unwrap().values_mut().filter(|t| t.user_id == user_id) {
                t.is_used = true;
            }
            Ok(())
        }

        async fn issue_reset(&self, user_id: Uuid, ttl: chrono::Duration, _ip: Option<String>, _user_agent: Option<String>) -> Result<OneTimeToken, AuthError> {
            let t = Self::new_token(user_id, ttl);
            self.resets.lock().unwrap().insert(t.token, t.clone());
            Ok(t)
        }

        async fn find_reset(&self, token: Uuid) -> Result<Option<OneTimeToken>, AuthError> {
            Ok(self.resets.lock().unwrap().get(&token).cloned())
        }

        async fn consume_reset(&self, id: Uuid) -> Result<(), AuthError> {
            for t in self.resets.lock().unwrap().values_mut().filter(|t| t.id == id) {
                t.is_used = true;
            }
            Ok(())
        }

        async fn blacklist(&self, jti: Uuid, _user_id: Uuid, _expires_at: DateTime<Utc>) -> Result<(), AuthError> {
            self.blacklisted.lock().unwrap().insert(jti);
            Ok(())
        }

        async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, AuthError> {
            Ok(self.blacklisted.lock().unwrap().contains(&jti))
        }
    }
}
