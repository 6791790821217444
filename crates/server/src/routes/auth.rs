use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::types::{ApiMessage, ApiResponse};
use models::enums::Role;
use serde::{Deserialize, Serialize};
use service::accounts::{self, ProfilePatch, UserFilter, UserView};
use service::auth::domain::{AuthSession, LoginInput, RegisterInput, RegisteredUser};
use service::pagination::Page;
use tracing::warn;

use crate::auth::{client_meta, AuthContext, ServerState, AUTH_COOKIE};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{created, done, ok, ApiResult, Created, PageQuery};

#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenInput {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailInput {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Validation failed"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, headers: HeaderMap, ApiJson(input): ApiJson<RegisterInput>) -> Created<RegisteredUser> {
    let user = state.auth.register(input, client_meta(&headers)).await?;
    created("Registration successful. Please check your email to verify your account.", user)
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in"), (status = 401, description = "Invalid credentials"), (status = 403, description = "Inactive or unverified")))]
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<ApiResponse<AuthSession>>), JsonApiError> {
    let session = state.auth.login(input, client_meta(&headers)).await?;
    let jar = jar.add(session_cookie(session.access.clone()));
    Ok((jar, Json(ApiResponse::ok("Login successful", session))))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "auth", request_body = crate::openapi::RefreshRequest,
    responses((status = 200, description = "Logged out"), (status = 401, description = "Invalid token")))]
pub async fn logout(
    State(state): State<ServerState>,
    _ctx: AuthContext,
    jar: CookieJar,
    ApiJson(input): ApiJson<RefreshInput>,
) -> Result<(CookieJar, Json<ApiMessage>), JsonApiError> {
    state.auth.logout(&input.refresh).await?;
    let mut expired = Cookie::from(AUTH_COOKIE);
    expired.set_path("/");
    Ok((jar.remove(expired), Json(ApiMessage::ok("Logout successful"))))
}

#[utoipa::path(post, path = "/api/auth/token/refresh", tag = "auth", request_body = crate::openapi::RefreshRequest,
    responses((status = 200, description = "New access token"), (status = 401, description = "Invalid token")))]
pub async fn refresh(State(state): State<ServerState>, ApiJson(input): ApiJson<RefreshInput>) -> ApiResult<AccessToken> {
    let access = state.auth.refresh(&input.refresh).await?;
    ok("Token refreshed", AccessToken { access })
}

#[utoipa::path(get, path = "/api/auth/verify-email", tag = "auth", params(TokenInput),
    responses((status = 200, description = "Verified"), (status = 400, description = "Invalid, expired or used token")))]
pub async fn verify_email_link(State(state): State<ServerState>, ApiQuery(input): ApiQuery<TokenInput>) -> Result<Json<ApiMessage>, JsonApiError> {
    state.auth.verify_email(&input.token).await?;
    done("Email verified successfully")
}

#[utoipa::path(post, path = "/api/auth/verify-email", tag = "auth", request_body = crate::openapi::TokenRequest,
    responses((status = 200, description = "Verified"), (status = 400, description = "Invalid, expired or used token")))]
pub async fn verify_email(State(state): State<ServerState>, ApiJson(input): ApiJson<TokenInput>) -> Result<Json<ApiMessage>, JsonApiError> {
    state.auth.verify_email(&input.token).await?;
    done("Email verified successfully")
}

#[utoipa::path(post, path = "/api/auth/resend-verification", tag = "auth", request_body = crate::openapi::EmailRequest,
    responses((status = 200, description = "Sent"), (status = 400, description = "Already verified"), (status = 404, description = "Unknown email")))]
pub async fn resend_verification(State(state): State<ServerState>, ApiJson(input): ApiJson<EmailInput>) -> Result<Json<ApiMessage>, JsonApiError> {
    state.auth.resend_verification(&input.email).await?;
    done("Verification email sent")
}

#[utoipa::path(post, path = "/api/auth/change-password", tag = "auth", request_body = crate::openapi::ChangePasswordRequest,
    responses((status = 200, description = "Changed"), (status = 400, description = "Validation failed")))]
pub async fn change_password(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiJson(input): ApiJson<ChangePasswordInput>,
) -> Result<Json<ApiMessage>, JsonApiError> {
    state
        .auth
        .change_password(ctx.user_id, &input.old_password, &input.new_password, &input.new_password_confirm)
        .await?;
    done("Password changed successfully")
}

/// Answers the same way whether or not the email is registered.
#[utoipa::path(post, path = "/api/auth/forgot-password", tag = "auth", request_body = crate::openapi::EmailRequest,
    responses((status = 200, description = "Reset link sent if the account exists")))]
pub async fn forgot_password(State(state): State<ServerState>, headers: HeaderMap, ApiJson(input): ApiJson<EmailInput>) -> Json<ApiMessage> {
    if let Err(e) = state.auth.request_password_reset(&input.email, client_meta(&headers)).await {
        warn!(error = %e, "password reset request failed");
    }
    Json(ApiMessage::ok("If an account exists with this email, a password reset link has been sent."))
}

#[utoipa::path(post, path = "/api/auth/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordRequest,
    responses((status = 200, description = "Password reset"), (status = 400, description = "Invalid or expired token")))]
pub async fn reset_password(State(state): State<ServerState>, ApiJson(input): ApiJson<ResetPasswordInput>) -> Result<Json<ApiMessage>, JsonApiError> {
    state.auth.reset_password(&input.token, &input.new_password, &input.new_password_confirm).await?;
    done("Password has been reset successfully")
}

#[utoipa::path(get, path = "/api/auth/profile", tag = "auth", responses((status = 200, description = "Caller profile")))]
pub async fn profile(State(state): State<ServerState>, ctx: AuthContext) -> ApiResult<UserView> {
    ok("Profile retrieved", accounts::get_profile(&state.db, ctx.user_id).await?)
}

#[utoipa::path(put, path = "/api/auth/profile", tag = "auth", request_body = crate::openapi::ProfileRequest,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation failed"), (status = 409, description = "Username taken")))]
pub async fn update_profile(State(state): State<ServerState>, ctx: AuthContext, ApiJson(patch): ApiJson<ProfilePatch>) -> ApiResult<UserView> {
    ok("Profile updated successfully", accounts::update_profile(&state.db, ctx.user_id, patch).await?)
}

#[utoipa::path(get, path = "/api/auth/users", tag = "auth", params(PageQuery),
    responses((status = 200, description = "Users"), (status = 403, description = "Admins only")))]
pub async fn users(
    State(state): State<ServerState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<UserFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<UserView>> {
    ctx.require(&[Role::Admin, Role::SuperAdmin])?;
    ok("Users retrieved", accounts::list_users(&state.db, filter, page.pagination()).await?)
}
