//! Employee record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::de::lenient_f64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub employee_id: String,
    pub name: String,
    pub role: Option<String>,
    /// Default base pay pulled into new payroll rows.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub base_pay: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn new(name: String, base_pay: f64) -> Self {
        Self {
            employee_id: Uuid::new_v4().to_string(),
            name,
            role: None,
            base_pay,
            active: true,
            created_at: Utc::now(),
        }
    }
}
