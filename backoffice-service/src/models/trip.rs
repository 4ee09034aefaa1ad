//! Trip record. Read-only input to the payroll overtime calculation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::de::lenient_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Planned,
    InTransit,
    Delivered,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planned => "planned",
            TripStatus::InTransit => "in_transit",
            TripStatus::Delivered => "delivered",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    #[serde(rename = "_id")]
    pub trip_id: String,
    pub driver_id: String,
    pub status: TripStatus,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance_km: f64,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(driver_id: String, status: TripStatus, distance_km: f64) -> Self {
        Self {
            trip_id: Uuid::new_v4().to_string(),
            driver_id,
            status,
            distance_km,
            origin: None,
            destination: None,
            pickup_date: None,
            delivery_date: None,
            created_at: Utc::now(),
        }
    }

    /// Date the trip counts under for pay-period filtering: delivery
    /// date when present, pickup date otherwise.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.delivery_date.or(self.pickup_date)
    }
}
