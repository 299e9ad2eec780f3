//! End-to-end API tests: real router, real storage in a temp dir,
//! requests driven through the full stack with `tower::ServiceExt`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use baon_server::catalog::StaticCatalog;
use baon_server::core::{AppState, server};
use baon_server::engine::OrderEngine;
use baon_server::store::EngineStore;

const ADMIN: (&str, &str) = ("admin-1", "ADMIN");
const STAFF: (&str, &str) = ("staff-1", "STAFF");
const PARENT: (&str, &str) = ("parent-1", "PARENT");

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = EngineStore::open(dir.path().join("baon.redb")).unwrap();
    let catalog = Arc::new(StaticCatalog::new());
    catalog.insert_product("adobo", "Chicken Adobo", Decimal::from(50));
    let engine = Arc::new(OrderEngine::new(store, catalog));
    (server::router(AppState::with_engine(engine)), dir)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder.header("x-actor-id", id).header("x-actor-role", role);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Seed inventory and a parent wallet through the admin surface.
async fn seed(app: &Router, stock: u32, balance: i64) {
    let (status, _) = send(
        app,
        "PUT",
        "/api/inventory/adobo",
        Some(ADMIN),
        Some(json!({ "product_name": "Chicken Adobo", "stock": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    if balance > 0 {
        let (status, _) = send(
            app,
            "POST",
            "/api/accounts/parent-1/top-up",
            Some(ADMIN),
            Some(json!({ "amount": balance })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

fn order_body(quantity: u32, method: &str) -> Value {
    json!({
        "child": "child-1",
        "scheduled_date": "2026-08-10",
        "payment_method": method,
        "lines": [{ "product_id": "adobo", "quantity": quantity }]
    })
}

#[tokio::test]
async fn health_endpoint_needs_no_identity() {
    let (app, _dir) = test_app();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_identity_headers_are_rejected() {
    let (app, _dir) = test_app();
    let (status, body) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn checkout_refund_round_trip() {
    let (app, _dir) = test_app();
    seed(&app, 10, 500).await;

    // parent checks out 2 × ₱50 against their wallet
    let (status, order) = send(
        &app,
        "POST",
        "/api/orders",
        Some(PARENT),
        Some(order_body(2, "BALANCE")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["payment_status"], "PAID");
    assert_eq!(order["total"], "100");
    let order_id = order["id"].as_str().unwrap().to_string();

    // wallet and stock reflect the checkout
    let (_, account) = send(&app, "GET", "/api/accounts/parent-1", Some(PARENT), None).await;
    assert_eq!(account["balance"], "400");
    let (_, record) = send(&app, "GET", "/api/inventory/adobo", Some(STAFF), None).await;
    assert_eq!(record["stock"], 8);

    // staff advances fulfillment
    let (status, order) = send(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/status"),
        Some(STAFF),
        Some(json!({ "status": "PREPARING" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "PREPARING");

    // admin refunds; the second attempt is a distinct no-op outcome
    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/refund"),
        Some(ADMIN),
        Some(json!({ "reason": "field trip cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "REFUNDED");

    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/refund"),
        Some(ADMIN),
        Some(json!({ "reason": "field trip cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "ALREADY_REFUNDED");

    // everything restored, credited exactly once
    let (_, account) = send(&app, "GET", "/api/accounts/parent-1", Some(PARENT), None).await;
    assert_eq!(account["balance"], "500");
    let (_, record) = send(&app, "GET", "/api/inventory/adobo", Some(STAFF), None).await;
    assert_eq!(record["stock"], 10);
}

#[tokio::test]
async fn insufficient_stock_maps_to_conflict() {
    let (app, _dir) = test_app();
    seed(&app, 1, 500).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(PARENT),
        Some(order_body(2, "BALANCE")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    // nothing was reserved
    let (_, record) = send(&app, "GET", "/api/inventory/adobo", Some(STAFF), None).await;
    assert_eq!(record["stock"], 1);
}

#[tokio::test]
async fn parents_cannot_refund_or_read_foreign_wallets() {
    let (app, _dir) = test_app();
    seed(&app, 10, 500).await;

    let (_, order) = send(
        &app,
        "POST",
        "/api/orders",
        Some(PARENT),
        Some(order_body(1, "BALANCE")),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/refund"),
        Some(PARENT),
        Some(json!({ "reason": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        "GET",
        "/api/accounts/parent-1",
        Some(("parent-2", "PARENT")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cash_orders_await_confirmation() {
    let (app, _dir) = test_app();
    seed(&app, 10, 0).await;

    let (status, order) = send(
        &app,
        "POST",
        "/api/orders",
        Some(PARENT),
        Some(order_body(1, "CASH")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "AWAITING_PAYMENT");
    assert!(order["payment_due_at"].is_string());
    let order_id = order["id"].as_str().unwrap();

    let (status, order) = send(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/confirm-payment"),
        Some(STAFF),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["payment_status"], "PAID");
    assert_eq!(order["status"], "PENDING");
}
