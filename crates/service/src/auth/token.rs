//! JWT access and refresh tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use models::enums::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, user: &AuthUser, token_type: TokenType, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role,
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry, then require the given token type.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;
        if data.claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "owner@shop.com".into(),
            username: "owner".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Barbershop,
            is_email_verified: true,
            is_active: true,
            is_deleted: false,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let codec = TokenCodec::new("secret");
        let u = user();
        let token = codec.issue(&u, TokenType::Access, Duration::minutes(5)).unwrap();
        let claims = codec.decode(&token, TokenType::Access).unwrap();
        assert_eq!(claims.uid, u.id);
        assert_eq!(claims.role, Role::Barbershop);
        assert_eq!(claims.sub, "owner@shop.com");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let codec = TokenCodec::new("secret");
        let token = codec.issue(&user(), TokenType::Refresh, Duration::days(1)).unwrap();
        assert!(matches!(codec.decode(&token, TokenType::Access), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let codec = TokenCodec::new("secret");
        let expired = codec.issue(&user(), TokenType::Access, Duration::minutes(-5)).unwrap();
        assert!(matches!(codec.decode(&expired, TokenType::Access), Err(AuthError::TokenExpired)));

        let other = TokenCodec::new("other").issue(&user(), TokenType::Access, Duration::minutes(5)).unwrap();
        assert!(matches!(codec.decode(&other, TokenType::Access), Err(AuthError::InvalidToken)));
    }
}
