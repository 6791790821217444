use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use serde_json::{json, Value};
use service::auth::AuthConfig;
use service::mailer::MemoryMailer;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use server::auth::ServerState;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn build_app() -> anyhow::Result<(Router, Arc<MemoryMailer>)> {
    let db = models::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    let mailer = Arc::new(MemoryMailer::default());
    let state = ServerState::with_mailer(db, AuthConfig::with_secret("test-secret"), mailer.clone());
    Ok((server::app(state), mailer))
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Option<String>, Value)> {
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = res.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, cookie, body))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn token_from_link(body: &str) -> Option<String> {
    let start = body.find("token=")? + "token=".len();
    Some(body[start..].split_whitespace().next()?.to_string())
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, _) = build_app().await?;

    let (status, _, body) = send(&app, Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, _) = build_app().await?;

    let (status, _, body) = send(&app, Request::builder().uri("/api/auth/profile").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, get_with_token("/api/barbershop/appointments", "garbage")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_verify_login_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, mailer) = build_app().await?;

    let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
    let email = format!("flow_{tag}@example.com");
    let password = "Str0ng!Passw0rd";

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "email": email,
                "username": format!("flow_{tag}"),
                "first_name": "Flow",
                "last_name": "Tester",
                "password": password,
                "password_confirm": password,
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);

    // unverified accounts cannot log in
    let (status, _, _) = send(&app, post_json("/api/auth/login", json!({ "email": email, "password": password }))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mail = mailer
        .sent()
        .into_iter()
        .rev()
        .find(|m| m.to == email)
        .expect("verification mail");
    let token = token_from_link(&mail.body).expect("token in link");
    let (status, _, _) = send(&app, post_json("/api/auth/verify-email", json!({ "token": token }))).await?;
    assert_eq!(status, StatusCode::OK);

    // a used token is rejected
    let (status, _, _) = send(&app, post_json("/api/auth/verify-email", json!({ "token": token }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, cookie, body) = send(&app, post_json("/api/auth/login", json!({ "email": email, "password": password }))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(cookie.unwrap_or_default().starts_with("auth_token="));
    let access = body["data"]["access"].as_str().unwrap_or_default().to_string();
    let refresh = body["data"]["refresh"].as_str().unwrap_or_default().to_string();
    assert!(!access.is_empty());

    let (status, _, body) = send(&app, get_with_token("/api/auth/profile", &access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email.as_str());

    // customers cannot list users or reach tenant routes
    let (status, _, _) = send(&app, get_with_token("/api/auth/users", &access)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send(&app, get_with_token("/api/barbershop/dashboard/stats", &access)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(&app, post_json("/api/auth/token/refresh", json!({ "refresh": refresh }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access"].is_string());

    let mut logout = post_json("/api/auth/logout", json!({ "refresh": refresh }));
    logout
        .headers_mut()
        .insert(header::AUTHORIZATION, format!("Bearer {access}").parse()?);
    let (status, _, _) = send(&app, logout).await?;
    assert_eq!(status, StatusCode::OK);

    // blacklisted after logout
    let (status, _, _) = send(&app, post_json("/api/auth/token/refresh", json!({ "refresh": refresh }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn forgot_password_does_not_reveal_accounts() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, mailer) = build_app().await?;

    let unknown = format!("nobody_{}@example.com", Uuid::new_v4().simple());
    let (status, _, body) = send(&app, post_json("/api/auth/forgot-password", json!({ "email": unknown }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(mailer.sent().iter().all(|m| m.to != unknown));
    Ok(())
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, _) = build_app().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, _, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    Ok(())
}

#[tokio::test]
async fn bootstrapped_super_admin_reaches_operator_routes() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, _) = build_app().await?;
    let db = models::db::connect().await?;

    let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
    let email = format!("root_{tag}@example.com");
    let password = "R00t!Passw0rd";
    let seed = server::startup::super_admin_seed(|key| match key {
        "SUPER_ADMIN_EMAIL" => Some(email.clone()),
        "SUPER_ADMIN_PASSWORD" => Some(password.to_string()),
        _ => None,
    })
    .expect("seed from both required values");
    server::startup::bootstrap_super_admin(&db, seed).await?;

    let (status, _, body) = send(&app, post_json("/api/auth/login", json!({ "email": email, "password": password }))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let access = body["data"]["access"].as_str().unwrap_or_default().to_string();

    let (status, _, body) = send(&app, get_with_token("/api/super-admin/dashboard/stats", &access)).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(())
}
