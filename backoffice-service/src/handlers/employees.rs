use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

use crate::models::Employee;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, message = "Employee name is required"))]
    pub name: String,
    pub role: Option<String>,
    #[serde(default)]
    pub base_pay: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub base_pay: Option<f64>,
    pub active: Option<bool>,
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut employee = Employee::new(payload.name, payload.base_pay);
    employee.role = payload.role;
    state.store.put_employee(&employee).await?;
    tracing::info!(employee_id = %employee.employee_id, "Created employee");
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn list_employees(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let employees = state.store.list_employees().await?;
    Ok(Json(employees))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let employee = state
        .store
        .get_employee(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Employee {} not found", id)))?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut employee = state
        .store
        .get_employee(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Employee {} not found", id)))?;

    if let Some(name) = payload.name {
        if name.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Employee name cannot be empty"
            )));
        }
        employee.name = name;
    }
    if let Some(role) = payload.role {
        employee.role = Some(role);
    }
    if let Some(base_pay) = payload.base_pay {
        employee.base_pay = base_pay;
    }
    if let Some(active) = payload.active {
        employee.active = active;
    }

    state.store.put_employee(&employee).await?;
    Ok(Json(employee))
}
