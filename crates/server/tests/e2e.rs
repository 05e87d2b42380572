//! Full lifecycle over HTTP: two users register, one posts a service, the
//! other bids on it, then accept -> complete -> evaluate, asserting the
//! visible state of both entities after every step.
use std::net::SocketAddr;

use migration::MigratorTrait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::auth::ServerState;
use server::routes;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");
    if std::env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }

    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let state = ServerState { db, jwt_secret: "test-secret".into() };
    let app = routes::build_router(CorsLayer::very_permissive(), state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().expect("reqwest client")
}

/// Register a user and return an authenticated client for them.
async fn signed_in_user(base: &str, prefix: &str) -> anyhow::Result<reqwest::Client> {
    let c = client();
    let email = format!("{}_{}@example.com", prefix, Uuid::new_v4());
    let res = c
        .post(format!("{}/auth/register", base))
        .json(&json!({
            "email": email,
            "name": "E2e User",
            "password": "S3curePass!",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = c
        .post(format!("{}/auth/login", base))
        .json(&json!({"email": email, "password": "S3curePass!"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(c)
}

fn service_body() -> Value {
    json!({
        "title": "Fix kitchen sink",
        "description": "Leaking trap under the kitchen sink",
        "service_type": "plumbing",
        "location": "Campinas, SP",
        "location_type": "residential",
        "preferred_start_date": "2026-10-01T09:00:00Z",
        "preferred_end_date": "2026-10-03T18:00:00Z",
        "preferred_time": "morning",
        "requires_materials": true,
        "materials_description": "new trap and sealant",
        "budget_range": "350.00",
        "materials": [
            {"name": "sink trap", "quantity": 1, "unit": "unit", "estimated_price": "80.00"}
        ]
    })
}

fn proposal_body() -> Value {
    json!({
        "description": "Can fix it tomorrow morning",
        "labor_cost": "200.00",
        "material_cost": "75.00",
        "estimated_start_date": "2026-10-01T09:00:00Z",
        "estimated_end_date": "2026-10-01T12:00:00Z",
        "materials": [
            {"name": "sink trap", "quantity": 1, "unit": "unit", "unit_price": "75.00"}
        ]
    })
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn writes_require_a_session() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = client()
        .post(format!("{}/api/services", app.base_url))
        .json(&service_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn proposal_lifecycle_over_http() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let base = &app.base_url;
    let owner = signed_in_user(base, "e2e_owner").await?;
    let contractor = signed_in_user(base, "e2e_contractor").await?;

    // Owner posts a service with one required material
    let res = owner.post(format!("{}/api/services", base)).json(&service_body()).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let svc: Value = res.json().await?;
    let service_id = svc["id"].as_i64().expect("service id");
    assert_eq!(svc["status"], "Active");
    assert_eq!(svc["materials"].as_array().map(Vec::len), Some(1));

    // Owner cannot bid on their own service
    let res = owner
        .post(format!("{}/api/proposals/service/{}", base, service_id))
        .json(&proposal_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Contractor bids; total cost is derived server-side
    let res = contractor
        .post(format!("{}/api/proposals/service/{}", base, service_id))
        .json(&proposal_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let proposal: Value = res.json().await?;
    let proposal_id = proposal["id"].as_i64().expect("proposal id");
    assert_eq!(proposal["status"], "Pending");
    assert_eq!(proposal["total_cost"], "275.00");

    // Contractor cannot accept their own proposal
    let res = contractor
        .post(format!("{}/api/proposals/{}/accept", base, proposal_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Evaluating before completion conflicts
    let res = owner
        .post(format!("{}/api/proposals/{}/evaluate", base, proposal_id))
        .json(&json!({"rating": 5}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Accept: proposal Accepted, service InProgress
    let res =
        owner.post(format!("{}/api/proposals/{}/accept", base, proposal_id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let accepted: Value = res.json().await?;
    assert_eq!(accepted["status"], "Accepted");
    let res = owner.get(format!("{}/api/services/{}", base, service_id)).send().await?;
    let svc: Value = res.json().await?;
    assert_eq!(svc["status"], "InProgress");

    // Service no longer accepts new proposals
    let res = contractor
        .post(format!("{}/api/proposals/service/{}", base, service_id))
        .json(&proposal_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Complete: both entities Completed, completed_at stamped
    let res =
        owner.post(format!("{}/api/proposals/{}/complete", base, proposal_id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let completed: Value = res.json().await?;
    assert_eq!(completed["status"], "Completed");
    assert!(!completed["completed_at"].is_null());
    let res = owner.get(format!("{}/api/services/{}", base, service_id)).send().await?;
    let svc: Value = res.json().await?;
    assert_eq!(svc["status"], "Completed");

    // Evaluate with an out-of-range rating, then a valid one
    let res = owner
        .post(format!("{}/api/proposals/{}/evaluate", base, proposal_id))
        .json(&json!({"rating": 6}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = owner
        .post(format!("{}/api/proposals/{}/evaluate", base, proposal_id))
        .json(&json!({"rating": 5, "comment": "fast and clean"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let evaluated: Value = res.json().await?;
    assert_eq!(evaluated["rating"], 5);
    assert_eq!(evaluated["evaluation_comment"], "fast and clean");

    Ok(())
}
