mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

async fn paid_invoice(app: &TestApp, amount: f64) -> String {
    let (_, invoice) = app
        .post(
            "/invoices",
            json!({
                "customer_name": "Acme Freight",
                "line_items": [{ "description": "Haulage", "quantity": 1, "unit_price": amount }]
            }),
        )
        .await;
    let id = invoice["invoice_id"].as_str().unwrap().to_string();
    app.post(&format!("/invoices/{}/status", id), json!({ "status": "paid" }))
        .await;
    id
}

#[tokio::test]
async fn dashboard_rolls_up_revenue_outstanding_and_leave() {
    let app = TestApp::new();

    paid_invoice(&app, 100.0).await;
    paid_invoice(&app, 250.5).await;

    // One unpaid invoice contributes to outstanding, not revenue.
    let (_, unpaid) = app
        .post(
            "/invoices",
            json!({
                "customer_name": "Slow Payer",
                "line_items": [{ "description": "Haulage", "quantity": 1, "unit_price": 75.0 }]
            }),
        )
        .await;
    app.post(
        &format!("/invoices/{}/status", unpaid["invoice_id"].as_str().unwrap()),
        json!({ "status": "unpaid" }),
    )
    .await;

    // Drafts count toward neither figure.
    app.post(
        "/invoices",
        json!({
            "customer_name": "Draft Customer",
            "line_items": [{ "description": "Haulage", "quantity": 1, "unit_price": 999.0 }]
        }),
    )
    .await;

    app.post(
        "/leave-requests",
        json!({
            "employee_id": "emp-1",
            "leave_type": "annual",
            "start_date": "2026-09-01",
            "end_date": "2026-09-05"
        }),
    )
    .await;

    let year = chrono::Utc::now().format("%Y").to_string();
    let (status, dashboard) = app.get(&format!("/reports/dashboard?year={}", year)).await;
    assert_eq!(status, StatusCode::OK);

    let monthly: f64 = dashboard["monthly_revenue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .sum();
    assert_eq!(monthly, 350.5);
    assert_eq!(dashboard["outstanding_total"], 75.0);
    assert_eq!(dashboard["pending_leave_requests"], 1);
}

#[tokio::test]
async fn resolved_leave_requests_drop_out_of_the_pending_count() {
    let app = TestApp::new();

    let (_, request) = app
        .post(
            "/leave-requests",
            json!({
                "employee_id": "emp-1",
                "leave_type": "sick",
                "start_date": "2026-09-01",
                "end_date": "2026-09-02"
            }),
        )
        .await;
    let id = request["_id"].as_str().unwrap();

    let (status, resolved) = app
        .post(
            &format!("/leave-requests/{}/status", id),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "approved");

    // A resolved request cannot flip again.
    let (status, _) = app
        .post(
            &format!("/leave-requests/{}/status", id),
            json!({ "status": "rejected" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, dashboard) = app.get("/reports/dashboard").await;
    assert_eq!(dashboard["pending_leave_requests"], 0);
}

#[tokio::test]
async fn payroll_trend_lists_paid_runs_chronologically() {
    let app = TestApp::new();

    let (_, employee) = app
        .post("/employees", json!({ "name": "Dana Driver", "base_pay": 4000.0 }))
        .await;
    let employee_id = employee["_id"].as_str().unwrap();

    for (start, end) in [
        ("2026-02-01", "2026-02-28"),
        ("2026-01-01", "2026-01-31"),
    ] {
        let (_, run) = app
            .post(
                "/payroll-runs",
                json!({ "pay_period_start": start, "pay_period_end": end }),
            )
            .await;
        let run_id = run["_id"].as_str().unwrap();
        app.post(
            &format!("/payroll-runs/{}/employees", run_id),
            json!({ "employee_ids": [employee_id] }),
        )
        .await;
        app.post(&format!("/payroll-runs/{}/finalize", run_id), json!({}))
            .await;
    }

    // A draft run stays out of the series.
    app.post(
        "/payroll-runs",
        json!({ "pay_period_start": "2026-03-01", "pay_period_end": "2026-03-31" }),
    )
    .await;

    let (status, trend) = app.get("/reports/payroll-trend").await;
    assert_eq!(status, StatusCode::OK);
    let points = trend.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["period_end"], "2026-01-31");
    assert_eq!(points[1]["period_end"], "2026-02-28");
    assert_eq!(points[0]["net_total"], 4000.0);
}
