use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [
        ("admin1", "admin"),
        ("shura1", "shura"),
        ("rafia", "recipient"),
        ("donor1", "donor"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }

    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::router(Arc::new(engine), db)
}

fn basic_auth(user: &str) -> String {
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{user}:password"))
    )
}

fn json_request(method: &str, uri: &str, user: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(user))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(user))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let app = app().await;

    let response = app
        .oneshot(Request::builder().uri("/wallet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn appeal_review_flow_over_http() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/appeals",
            "rafia",
            &json!({
                "title": "Rent support",
                "category": "house_rent",
                "amount_minor": 70_000_00,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let appeal = body_json(response).await;
    assert_eq!(appeal["status"], "pending");
    let id = appeal["id"].as_str().unwrap().to_string();

    // Donors may not review.
    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/appeals/{id}/approve"),
            "donor1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/appeals/{id}/approve"),
            "shura1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let appeal = body_json(response).await;
    assert_eq!(appeal["status"], "approved");
    assert_eq!(appeal["approved_by"], "shura1");
    assert_eq!(appeal["fulfillment_source"], "platform");
}

#[tokio::test]
async fn reject_without_reason_returns_the_offending_field() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/appeals",
            "rafia",
            &json!({
                "title": "School fees",
                "category": "school_fee",
                "amount_minor": 20_000_00,
            }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/appeals/{id}/reject"),
            "shura1",
            &json!({ "reason": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "rejection_reason");
}

#[tokio::test]
async fn monthly_validation_surfaces_as_422() {
    let app = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/appeals",
            "rafia",
            &json!({
                "title": "Monthly rent",
                "category": "house_rent",
                "amount_minor": 10_000_00,
                "is_monthly": true,
                "months_required": 7,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "months_required");
}

#[tokio::test]
async fn admin_credit_shows_up_in_the_recipient_wallet() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/wallets/rafia/credit",
            "admin1",
            &json!({ "amount_minor": 200_00 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Non-admins cannot credit.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/wallets/rafia/credit",
            "donor1",
            &json!({ "amount_minor": 100_00 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/wallet", "rafia"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let wallet = body_json(response).await;
    assert_eq!(wallet["balance_minor"], 200_00);

    let response = app
        .oneshot(empty_request("GET", "/wallet/transactions", "rafia"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["transfer_by"], "Admin");
    assert_eq!(transactions[0]["description"], "Manual credit added by Admin");
}

#[tokio::test]
async fn fulfillment_run_is_admin_only() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/fulfillment/run", "rafia"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/system-wallet",
            "admin1",
            &json!({ "amount_minor": 1000_00 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("POST", "/fulfillment/run", "admin1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["remaining_balance_minor"], 1000_00);
    assert_eq!(report["fulfilled"].as_array().unwrap().len(), 0);
}
