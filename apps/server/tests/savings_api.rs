use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use nestegg_server::{api::app_router, build_state, config::Config};

const USER: &str = "user-42";

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        recalc_interval: Duration::from_secs(86_400),
        recalc_initial_delay: Duration::from_secs(30),
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn user_uri(path: &str) -> String {
    format!("/api/v1/users/{}{}", USER, path)
}

fn next_year() -> i32 {
    Utc::now().year() + 1
}

async fn create_asset(app: &Router, name: &str, total_cost: f64) -> Value {
    let (status, asset) = send(
        app,
        Method::POST,
        &user_uri("/assets"),
        Some(json!({ "name": name, "totalCost": total_cost, "endYear": next_year() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    asset
}

#[tokio::test]
async fn healthz_responds_ok() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn created_asset_is_priced_and_listed() {
    let (app, _tmp) = build_test_router().await;
    let asset = create_asset(&app, "Camper", 2400.0).await;

    assert_eq!(asset["status"], "ACTIVE");
    assert_eq!(asset["currentMoney"].as_f64(), Some(0.0));
    assert!(asset["monthlyContribution"].as_f64().unwrap() > 0.0);
    assert_eq!(
        asset["lastCalculatedMonth"].as_u64(),
        Some(u64::from(Utc::now().month()))
    );

    let (status, assets) = send(&app, Method::GET, &user_uri("/assets"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assets.as_array().unwrap().len(), 1);
    assert_eq!(assets[0]["name"], "Camper");
}

#[tokio::test]
async fn duplicate_and_invalid_assets_are_rejected() {
    let (app, _tmp) = build_test_router().await;
    create_asset(&app, "Camper", 2400.0).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &user_uri("/assets"),
        Some(json!({ "name": "Camper", "totalCost": 100.0, "endYear": next_year() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &user_uri("/assets"),
        Some(json!({
            "name": "Boat",
            "totalCost": 100.0,
            "currentMoney": 150.0,
            "endYear": next_year()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
}

#[tokio::test]
async fn deposit_and_overdraft_withdrawal() {
    let (app, _tmp) = build_test_router().await;
    create_asset(&app, "Camper", 2400.0).await;

    let (status, outcome) = send(
        &app,
        Method::POST,
        &user_uri("/deposit"),
        Some(json!({ "amount": 100.0, "category": "SAVING_POOL" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["targets"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        &user_uri("/withdraw"),
        Some(json!({ "amount": 500.0, "category": "SAVING_POOL", "targetName": "Camper" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, assets) = send(&app, Method::GET, &user_uri("/assets"), None).await;
    assert_eq!(assets[0]["currentMoney"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn deposit_without_targets_fails() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = send(
        &app,
        Method::POST,
        &user_uri("/deposit"),
        Some(json!({ "amount": 10.0, "category": "SAVING_POOL" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("No savings targets"));
}

#[tokio::test]
async fn plan_projection_and_close_with_transfer() {
    let (app, _tmp) = build_test_router().await;

    let (status, _) = send(&app, Method::GET, &user_uri("/plan/projection"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, plan) = send(
        &app,
        Method::PUT,
        &user_uri("/plan"),
        Some(json!({
            "age": 60,
            "retirementAge": 62,
            "expectLifespan": 64,
            "expectedMonthlyExpense": 1000.0,
            "annualExpenseIncrease": 0.01,
            "expectedInflation": 0.02
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["requiredFunds"].as_f64(), Some(74181.6));

    let (status, projection) = send(&app, Method::GET, &user_uri("/plan/projection"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projection["monthsUntilRetirement"], 24);

    let asset = create_asset(&app, "Camper", 2400.0).await;
    send(
        &app,
        Method::POST,
        &user_uri("/deposit"),
        Some(json!({ "amount": 300.0, "category": "SAVING_POOL", "targetName": "Camper" })),
    )
    .await;

    let close_uri = user_uri(&format!("/assets/{}/close", asset["id"].as_str().unwrap()));
    let (status, outcome) = send(
        &app,
        Method::POST,
        &close_uri,
        Some(json!({ "transfers": [{ "targetKind": "PLAN", "amount": 300.0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["deletedAssetIds"].as_array().unwrap().len(), 1);

    let (_, targets) = send(&app, Method::GET, &user_uri("/targets"), None).await;
    assert!(targets["assets"].as_array().unwrap().is_empty());
    assert_eq!(targets["plan"]["currentSavings"].as_f64(), Some(300.0));
}

#[tokio::test]
async fn unknown_target_kind_is_a_bad_request() {
    let (app, _tmp) = build_test_router().await;
    let (status, _) = send(&app, Method::GET, &user_uri("/targets/boat/Sunfish"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, &user_uri("/targets/asset/Sunfish"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completion_notification_is_persisted() {
    let (app, _tmp) = build_test_router().await;
    create_asset(&app, "Bike", 100.0).await;

    let (status, outcome) = send(
        &app,
        Method::POST,
        &user_uri("/deposit"),
        Some(json!({ "amount": 100.0, "category": "SAVING_POOL", "targetName": "Bike" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["statusChanges"][0]["to"], "COMPLETED");

    let mut notifications = Value::Null;
    for _ in 0..50 {
        let (_, body) = send(&app, Method::GET, &user_uri("/notifications"), None).await;
        if body.as_array().map(|a| !a.is_empty()).unwrap_or(false) {
            notifications = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let notifications = notifications.as_array().expect("notification was not persisted");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "COMPLETED");
}
