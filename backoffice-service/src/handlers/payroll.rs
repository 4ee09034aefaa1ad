use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::models::de::lenient_opt_f64;
use crate::models::PayrollRun;
use crate::services::payroll::{AddEmployeeOutcome, PayLineUpdate};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRunRequest {
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    /// Employees to place on the run immediately after creation.
    #[serde(default)]
    pub employee_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddEmployeesRequest {
    #[validate(length(min = 1, message = "At least one employee id is required"))]
    pub employee_ids: Vec<String>,
}

/// Pay component fields coerce leniently like the stored pay line;
/// a malformed value sets the component to 0, absent leaves it alone.
#[derive(Debug, Deserialize)]
pub struct UpdatePayLineRequest {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub base_pay: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub overtime: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub bonus: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub taxes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub deductions: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct AddEmployeesResponse {
    pub run: PayrollRun,
    pub results: Vec<AddEmployeeOutcome>,
}

pub async fn create_run(
    State(state): State<AppState>,
    Json(payload): Json<CreateRunRequest>,
) -> Result<impl IntoResponse, AppError> {
    let run = state
        .payroll
        .create_run(payload.pay_period_start, payload.pay_period_end)
        .await?;
    let run = if payload.employee_ids.is_empty() {
        run
    } else {
        let (run, _) = state
            .payroll
            .add_employees(&run.run_id, &payload.employee_ids)
            .await?;
        run
    };
    Ok((StatusCode::CREATED, Json(run)))
}

pub async fn list_runs(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let runs = state.store.list_payroll_runs().await?;
    Ok(Json(runs))
}

pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let run = state
        .store
        .get_payroll_run(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payroll run {} not found", id)))?;
    Ok(Json(run))
}

pub async fn add_employees(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddEmployeesRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let (run, results) = state.payroll.add_employees(&id, &payload.employee_ids).await?;
    Ok(Json(AddEmployeesResponse { run, results }))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(String, String)>,
    Json(payload): Json<UpdatePayLineRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = PayLineUpdate {
        base_pay: payload.base_pay,
        overtime: payload.overtime,
        bonus: payload.bonus,
        taxes: payload.taxes,
        deductions: payload.deductions,
    };
    let run = state.payroll.update_employee(&id, &employee_id, update).await?;
    Ok(Json(run))
}

pub async fn remove_employee(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let run = state.payroll.remove_employee(&id, &employee_id).await?;
    Ok(Json(run))
}

pub async fn approve_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let run = state.payroll.approve(&id).await?;
    Ok(Json(run))
}

pub async fn finalize_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let run = state.payroll.finalize(&id, payload.payment_date).await?;
    Ok(Json(run))
}
