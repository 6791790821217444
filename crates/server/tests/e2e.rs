use std::net::SocketAddr;

use migration::MigratorTrait;
use reqwest::StatusCode;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use service::auth::AuthConfig;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::auth::ServerState;

struct TestApp {
    base_url: String,
    db: sea_orm::DatabaseConnection,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn start_server() -> anyhow::Result<Option<TestApp>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing or SKIP_DB_TESTS set; skipping e2e");
        return Ok(None);
    }
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("migrations notice: {e}");
    }

    let state = ServerState::new(db.clone(), AuthConfig::with_secret("e2e-secret"));
    let app = server::app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = reqwest::Client::builder().cookie_store(true).build()?;
    Ok(Some(TestApp { base_url: format!("http://{addr}"), db, client }))
}

/// Registers a customer, then promotes it to a verified barbershop directly in the database.
async fn barbershop_session(app: &TestApp) -> anyhow::Result<String> {
    let tag = Uuid::new_v4().simple().to_string()[..10].to_string();
    let email = format!("shop_{tag}@example.com");
    let password = "Sh0pOwner!pass";

    let res = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": email,
            "username": format!("shop_{tag}"),
            "first_name": "Shop",
            "last_name": "Owner",
            "password": password,
            "password_confirm": password,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    models::user::Entity::update_many()
        .col_expr(models::user::Column::Role, Expr::value("barbershop"))
        .col_expr(models::user::Column::IsEmailVerified, Expr::value(true))
        .col_expr(models::user::Column::ShopName, Expr::value(format!("Shop {tag}")))
        .filter(models::user::Column::Email.eq(email.clone()))
        .exec(&app.db)
        .await?;

    let res = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    Ok(body["data"]["access"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn health_and_docs_are_served() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "status": "ok" }));

    let res = app.client.get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"]["/api/barbershop/appointments"].is_object());
    Ok(())
}

#[tokio::test]
async fn barbershop_books_and_completes_appointments() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let token = barbershop_session(&app).await?;

    let booking = json!({
        "customer_name": "Arjun",
        "customer_phone": "9876543210",
        "service": "Haircut",
        "barber_name": "Ravi",
        "appointment_date": "2030-01-15",
        "appointment_time": "10:00",
        "duration_minutes": 60,
        "amount": 300.0,
    });
    let res = app
        .client
        .post(app.url("/api/barbershop/appointments"))
        .bearer_auth(&token)
        .json(&booking)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    // same barber, overlapping half hour
    let mut clash = booking.clone();
    clash["appointment_time"] = json!("10:30");
    clash["duration_minutes"] = json!(30);
    let res = app
        .client
        .post(app.url("/api/barbershop/appointments"))
        .bearer_auth(&token)
        .json(&clash)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .client
        .get(app.url("/api/barbershop/schedule/available-slots?date=2030-01-15&barber=Ravi"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let slots: Value = res.json().await?;
    let available = |time: &str| {
        slots["data"]["time_slots"]
            .as_array()
            .and_then(|all| all.iter().find(|s| s["time"] == time))
            .map(|s| s["available"].clone())
    };
    assert_eq!(available("10:00"), Some(json!(false)));
    assert_eq!(available("10:30"), Some(json!(false)));
    assert_eq!(available("11:00"), Some(json!(true)));

    let res = app
        .client
        .patch(app.url(&format!("/api/barbershop/appointments/{id}/status")))
        .bearer_auth(&token)
        .json(&json!({ "status": "completed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["data"]["status"], "completed");

    let res = app
        .client
        .patch(app.url(&format!("/api/barbershop/appointments/{id}/status")))
        .bearer_auth(&token)
        .json(&json!({ "status": "teleported" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .client
        .get(app.url("/api/barbershop/activity-logs?action_type=appointment_completed"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let logs: Value = res.json().await?;
    assert_eq!(logs["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn tenants_cannot_see_each_others_records() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let owner = barbershop_session(&app).await?;
    let other = barbershop_session(&app).await?;

    let res = app
        .client
        .post(app.url("/api/barbershop/customers"))
        .bearer_auth(&owner)
        .json(&json!({ "name": "Kiran", "phone": "9000000001" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = app
        .client
        .get(app.url(&format!("/api/barbershop/customers/{id}")))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .client
        .get(app.url(&format!("/api/barbershop/customers/{id}")))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
