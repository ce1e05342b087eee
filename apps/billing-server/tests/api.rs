//! API integration tests.
//!
//! Each test builds the full router over a fresh in-memory database and
//! dispatches requests in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use billing_db::{Database, DbConfig};
use billing_server::config::ServerConfig;
use billing_server::routes;
use billing_server::state::AppState;

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ServerConfig::load().unwrap();
    routes::router(AppState::new(db, config))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_html(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

/// Seeds one customer and one product, returning their ids.
async fn seed(app: &Router) -> (i64, i64) {
    let (status, customer) = send(
        app,
        "POST",
        "/customers",
        Some(json!({ "name": "Mehta Stores", "city": "Nashik" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, product) = send(
        app,
        "POST",
        "/products",
        Some(json!({ "name": "Jute Bag 40x35", "unit_price": 45.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        customer["id"].as_i64().unwrap(),
        product["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn invoice_lifecycle_create_pay_settle() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    // Create: one valid item, one invalid (dropped silently)
    let (status, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "invoice_date": "2026-08-25",
            "items": [
                { "product_id": product_id, "quantity": 2.0, "unit_price": 45.5 },
                { "product_id": product_id, "quantity": 0.0, "unit_price": 45.5 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["invoice_number"], "INV-2026-08-001");
    assert_eq!(invoice["subtotal"], 91.0);
    assert_eq!(invoice["total_amount"], 91.0);
    assert_eq!(invoice["balance_amount"], 91.0);
    assert_eq!(invoice["status"], "pending");
    let invoice_id = invoice["id"].as_i64().unwrap();

    // Detail: only the surviving item was stored
    let (status, detail) = send(&app, "GET", &format!("/invoices/{invoice_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
    assert_eq!(detail["customer"]["name"], "Mehta Stores");

    // Partial payment
    let (status, paid) = send(
        &app,
        "POST",
        &format!("/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": 41.0, "payment_method": "upi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["invoice"]["status"], "partial");
    assert_eq!(paid["invoice"]["balance_amount"], 50.0);

    // Settling payment
    let (status, paid) = send(
        &app,
        "POST",
        &format!("/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": 50.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["invoice"]["status"], "paid");
    assert_eq!(paid["invoice"]["balance_amount"], 0.0);

    // Ledger shows both entries
    let (status, ledger) = send(
        &app,
        "GET",
        &format!("/invoices/{invoice_id}/payments"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invoice_with_percent_discount() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (status, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "invoice_date": "2026-08-25",
            "discount_type": "percent",
            "discount_value": 10.0,
            "items": [
                { "product_id": product_id, "quantity": 4.0, "unit_price": 50.0 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["subtotal"], 200.0);
    assert_eq!(invoice["discount_amount"], 20.0);
    assert_eq!(invoice["total_amount"], 180.0);
}

#[tokio::test]
async fn empty_invoice_rejected_with_400() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    // All items invalid → nothing survives normalization
    let (status, body) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "items": [
                { "product_id": product_id, "quantity": 0.0, "unit_price": 10.0 },
                { "product_id": 0, "quantity": 1.0, "unit_price": 10.0 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("line item"));
}

#[tokio::test]
async fn unknown_references_yield_404() {
    let app = test_app().await;
    let (_, product_id) = seed(&app).await;

    // Invoice against a customer that does not exist
    let (status, _) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": 9999,
            "items": [{ "product_id": product_id, "quantity": 1.0, "unit_price": 10.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/invoices/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/invoices/9999/payments",
        Some(json!({ "amount": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_payment_rejected() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 1.0, "unit_price": 10.0 }]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_i64().unwrap();

    for amount in [0.0, -5.0] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/invoices/{invoice_id}/payments"),
            Some(json!({ "amount": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn edit_replaces_items_and_keeps_number() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "invoice_date": "2026-08-25",
            "items": [{ "product_id": product_id, "quantity": 2.0, "unit_price": 45.5 }]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_i64().unwrap();
    let number = invoice["invoice_number"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/invoices/{invoice_id}"),
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 5.0, "unit_price": 20.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["invoice_number"], number.as_str());
    assert_eq!(updated["subtotal"], 100.0);
    assert_eq!(updated["total_amount"], 100.0);

    let (_, detail) = send(&app, "GET", &format!("/invoices/{invoice_id}"), None).await;
    let items = detail["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5.0);
}

#[tokio::test]
async fn delete_invoice_then_404() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 1.0, "unit_price": 10.0 }]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/invoices/{invoice_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, "GET", &format!("/invoices/{invoice_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_delete_is_soft() {
    let app = test_app().await;
    let (_, product_id) = seed(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Gone from the catalog listing, still fetchable by id
    let (_, listed) = send(&app, "GET", "/products", None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, product) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["is_active"], false);
}

#[tokio::test]
async fn api_prefix_serves_same_contract() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(json!({ "name": "Prefixed Customer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Prefixed Customer");

    let (status, listed) = send(&app, "GET", "/api/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stats_reflect_activity() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 2.0, "unit_price": 50.0 }]
        })),
    )
    .await;

    let (status, stats) = send(&app, "GET", "/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_customers"], 1);
    assert_eq!(stats["total_invoices"], 1);
    assert_eq!(stats["total_revenue"], 100.0);
    assert_eq!(stats["total_outstanding"], 100.0);
    assert_eq!(stats["recent_invoices"].as_array().unwrap().len(), 1);

    // The path the front end calls
    let (status, prefixed) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefixed["total_invoices"], 1);
}

#[tokio::test]
async fn invalid_catalog_input_rejected_with_400() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Jute Bag", "unit_price": -5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unit price"));

    let (status, body) = send(&app, "POST", "/customers", Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn null_discount_type_treated_as_none() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (status, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "discount_type": null,
            "discount_value": 10.0,
            "items": [{ "product_id": product_id, "quantity": 2.0, "unit_price": 50.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["discount_type"], "none");
    assert_eq!(invoice["discount_amount"], 0.0);
    assert_eq!(invoice["total_amount"], 100.0);
}

#[tokio::test]
async fn html_views_render() {
    let app = test_app().await;
    let (customer_id, product_id) = seed(&app).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer_id": customer_id,
            "invoice_date": "2026-08-25",
            "items": [{ "product_id": product_id, "quantity": 2.0, "unit_price": 45.5 }]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_i64().unwrap();

    let (status, dashboard) = send_html(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(dashboard.contains("Recent invoices"));
    assert!(dashboard.contains("INV-2026-08-001"));

    let (status, print) = send_html(&app, &format!("/print/invoice/{invoice_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(print.contains("INV-2026-08-001"));
    assert!(print.contains("Mehta Stores"));
    assert!(print.contains("91.00"));
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
