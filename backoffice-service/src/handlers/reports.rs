use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::compute::reports;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub year: i32,
    pub monthly_revenue: [f64; 12],
    pub outstanding_total: f64,
    pub pending_leave_requests: usize,
}

/// One round-trip dashboard rollup: revenue by month, what is still
/// owed, and how many leave requests wait on a decision.
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());

    let invoices = state.store.list_invoices(None).await?;
    let leave_requests = state.store.list_leave_requests().await?;

    Ok(Json(DashboardResponse {
        year,
        monthly_revenue: reports::monthly_revenue(&invoices, year),
        outstanding_total: reports::outstanding_total(&invoices),
        pending_leave_requests: reports::pending_leave_count(&leave_requests),
    }))
}

pub async fn payroll_trend(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let runs = state.store.list_payroll_runs().await?;
    Ok(Json(reports::payroll_trend(&runs)))
}
