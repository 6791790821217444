use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use models::enums::Role;
use sea_orm::DatabaseConnection;
use service::accounts::Actor;
use service::auth::domain::ClientMeta;
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::mailer::Mailer;
use uuid::Uuid;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: AuthConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        Self { db, auth: Arc::new(AuthService::new(repo, cfg)) }
    }

    /// Same as [`ServerState::new`] but delivering mail through `mailer`.
    pub fn with_mailer(db: DatabaseConnection, cfg: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        Self { db, auth: Arc::new(AuthService::new(repo, cfg).with_mailer(mailer)) }
    }
}

/// Identity of the caller, inserted by [`require_bearer_token_state`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthContext {
    pub fn actor(&self) -> Actor {
        Actor { user_id: self.user_id, role: self.role }
    }

    /// 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<Actor, JsonApiError> {
        if roles.contains(&self.role) {
            Ok(self.actor())
        } else {
            tracing::warn!(user_id = %self.user_id, role = %self.role, "role check failed");
            Err(JsonApiError::forbidden("you do not have permission to perform this action"))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| JsonApiError::unauthorized("authentication credentials were not provided"))
    }
}

const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/auth/register",
    "/api/auth/login",
    "/api/auth/token/refresh",
    "/api/auth/verify-email",
    "/api/auth/resend-verification",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
];

fn is_public(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS
        || PUBLIC_PATHS.contains(&path)
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
}

fn bearer_or_cookie(headers: &HeaderMap) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("invalid Authorization format, expected Bearer")),
        };
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Global middleware: everything outside the public whitelist needs a valid access token,
/// taken from `Authorization: Bearer` or the `auth_token` cookie.
pub async fn require_bearer_token_state(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return next.run(req).await;
    }

    let token = match bearer_or_cookie(req.headers()) {
        Ok(Some(t)) => t,
        Ok(None) => {
            tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
            return JsonApiError::unauthorized("authentication credentials were not provided").into_response();
        }
        Err(e) => {
            tracing::warn!(path = %path, "malformed Authorization header");
            return e.into_response();
        }
    };

    match state.auth.authenticate(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(AuthContext { user_id: claims.uid, email: claims.sub, role: claims.role });
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            JsonApiError::from(e).into_response()
        }
    }
}

/// Caller address from `X-Forwarded-For` (first hop), else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    forwarded
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()).map(str::trim))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn client_meta(headers: &HeaderMap) -> ClientMeta {
    ClientMeta {
        ip_address: client_ip(headers),
        user_agent: headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let mut h = HeaderMap::new();
        h.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&h).as_deref(), Some("10.0.0.2"));
        h.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&h).as_deref(), Some("203.0.113.7"));
        assert!(client_ip(&HeaderMap::new()).is_none());
    }

    #[test]
    fn token_from_header_or_cookie() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=abc"));
        assert_eq!(bearer_or_cookie(&h).ok().flatten().as_deref(), Some("abc"));
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(bearer_or_cookie(&h).ok().flatten().as_deref(), Some("xyz"));
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_or_cookie(&h).is_err());
    }

    #[test]
    fn whitelist_covers_public_routes_only() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/api/auth/login"));
        assert!(is_public(&Method::GET, "/docs/index.html"));
        assert!(is_public(&Method::OPTIONS, "/api/barbershop/sales"));
        assert!(!is_public(&Method::GET, "/api/auth/profile"));
        assert!(!is_public(&Method::POST, "/api/auth/logout"));
    }

    #[test]
    fn require_checks_role() {
        let ctx = AuthContext { user_id: Uuid::new_v4(), email: "a@b.c".into(), role: Role::Admin };
        assert!(ctx.require(&[Role::Admin, Role::SuperAdmin]).is_ok());
        assert!(ctx.require(&[Role::Barbershop]).is_err());
    }
}
