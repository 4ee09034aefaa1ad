mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, TAX_LABEL};

#[tokio::test]
async fn quote_totals_match_invoice_math() {
    let app = TestApp::new();

    let (status, quote) = app
        .post(
            "/quotes",
            json!({
                "customer_name": "Acme Freight",
                "tax_type": "inclusive",
                "line_items": [{
                    "description": "Haulage",
                    "quantity": 1,
                    "unit_price": 230.0,
                    "tax_rate": TAX_LABEL
                }]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    // Inclusive pricing: the 230 already contains 30 of tax.
    assert_eq!(quote["subtotal"], 200.0);
    assert_eq!(quote["total_tax"], 30.0);
    assert_eq!(quote["total"], 230.0);
}

#[tokio::test]
async fn quote_locks_after_leaving_draft() {
    let app = TestApp::new();

    let (_, quote) = app
        .post(
            "/quotes",
            json!({
                "customer_name": "Acme Freight",
                "line_items": [{ "description": "Haulage", "quantity": 1, "unit_price": 100.0 }]
            }),
        )
        .await;
    let id = quote["quote_id"].as_str().unwrap();

    let (status, _) = app
        .post(&format!("/quotes/{}/status", id), json!({ "status": "sent" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(&format!("/quotes/{}", id), json!({ "notes": "late edit" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/quotes/{}/line-items", id),
            json!({ "description": "Extra", "quantity": 1, "unit_price": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accepted_quote_converts_once() {
    let app = TestApp::new();

    let (_, quote) = app
        .post(
            "/quotes",
            json!({
                "customer_name": "Acme Freight",
                "line_items": [{
                    "description": "Haulage",
                    "quantity": 2,
                    "unit_price": 100.0,
                    "discount": 10.0,
                    "tax_rate": TAX_LABEL
                }]
            }),
        )
        .await;
    let id = quote["quote_id"].as_str().unwrap();

    // Cannot convert while still a draft.
    let (status, _) = app.post(&format!("/quotes/{}/convert", id), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.post(&format!("/quotes/{}/status", id), json!({ "status": "sent" }))
        .await;
    app.post(&format!("/quotes/{}/status", id), json!({ "status": "accepted" }))
        .await;

    let (status, invoice) = app.post(&format!("/quotes/{}/convert", id), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["status"], "unpaid");
    assert_eq!(invoice["subtotal"], 180.0);
    assert_eq!(invoice["total"], 207.0);

    let invoice_id = invoice["invoice_id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/invoices/{}", invoice_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["customer_name"], "Acme Freight");

    let (_, quote) = app.get(&format!("/quotes/{}", id)).await;
    assert_eq!(quote["converted_invoice_id"], invoice_id);

    // Second conversion is refused.
    let (status, _) = app.post(&format!("/quotes/{}/convert", id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn expired_quote_cannot_advance() {
    let app = TestApp::new();

    let (_, quote) = app
        .post("/quotes", json!({ "customer_name": "Acme Freight" }))
        .await;
    let id = quote["quote_id"].as_str().unwrap();

    app.post(&format!("/quotes/{}/status", id), json!({ "status": "expired" }))
        .await;

    // Expired and accepted share a rank; neither follows the other.
    let (status, _) = app
        .post(&format!("/quotes/{}/status", id), json!({ "status": "accepted" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
