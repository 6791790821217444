use chrono::{DateTime, Utc};
use models::enums::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Self-service registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    pub password: String,
    pub password_confirm: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Where a request came from, recorded on login and reset attempts.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl AuthUser {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name).trim().to_string();
        if name.is_empty() { self.email.clone() } else { name }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            role: self.role,
            is_email_verified: self.is_email_verified,
        }
    }
}

/// Fields needed to insert an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// A self-registration: the account, its password and the first
/// verification token, stored together or not at all.
#[derive(Debug, Clone)]
pub struct Registration {
    pub account: NewAccount,
    pub password_hash: String,
    pub password_algorithm: String,
    pub verification_ttl: chrono::Duration,
    pub meta: ClientMeta,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Single-use token for email verification or password reset.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: Uuid,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now <= self.expires_at
    }
}

/// One login attempt for the audit trail.
#[derive(Debug, Clone)]
pub struct LoginRecord {
    pub user_id: Option<Uuid>,
    pub email: String,
    pub meta: ClientMeta,
    pub status: models::enums::LoginStatus,
    pub failure_reason: Option<String>,
}

/// Account view returned with tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: Role,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access: String,
    pub refresh: String,
    pub user: UserSummary,
}
