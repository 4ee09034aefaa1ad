use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

use crate::models::{LeaveRequest, LeaveStatus};
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeaveRequest {
    #[validate(length(min = 1, message = "Employee id is required"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "Leave type is required"))]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveStatusRequest {
    pub status: String,
}

pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.end_date < payload.start_date {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Leave end date must not precede its start"
        )));
    }

    let mut request = LeaveRequest::new(
        payload.employee_id,
        payload.leave_type,
        payload.start_date,
        payload.end_date,
    );
    request.reason = payload.reason;

    state.store.put_leave_request(&request).await?;
    tracing::info!(leave_id = %request.leave_id, "Created leave request");
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_leave_requests(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let requests = state.store.list_leave_requests().await?;
    Ok(Json(requests))
}

/// Pending requests resolve to approved or rejected; a resolved request
/// stays resolved.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<LeaveStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut request = state
        .store
        .get_leave_request(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Leave request {} not found", id)))?;

    let next = match payload.status.as_str() {
        "approved" => LeaveStatus::Approved,
        "rejected" => LeaveStatus::Rejected,
        other => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid leave status: {}",
                other
            )))
        }
    };

    if request.status != LeaveStatus::Pending {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Leave request has already been {}",
            request.status.as_str()
        )));
    }

    request.status = next;
    state.store.put_leave_request(&request).await?;
    tracing::info!(leave_id = %id, status = next.as_str(), "Leave request resolved");
    Ok(Json(request))
}
