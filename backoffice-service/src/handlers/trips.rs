use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

use crate::models::{Trip, TripStatus};
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 1, message = "Driver id is required"))]
    pub driver_id: String,
    pub status: TripStatus,
    #[serde(default)]
    pub distance_km: f64,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TripListParams {
    pub driver_id: Option<String>,
}

pub async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut trip = Trip::new(payload.driver_id, payload.status, payload.distance_km);
    trip.origin = payload.origin;
    trip.destination = payload.destination;
    trip.pickup_date = payload.pickup_date;
    trip.delivery_date = payload.delivery_date;

    state.store.put_trip(&trip).await?;
    tracing::info!(trip_id = %trip.trip_id, driver_id = %trip.driver_id, "Created trip");
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<TripListParams>,
) -> Result<impl IntoResponse, AppError> {
    let trips = state.store.list_trips(params.driver_id.as_deref()).await?;
    Ok(Json(trips))
}
