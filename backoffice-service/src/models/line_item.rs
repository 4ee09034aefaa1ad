//! Line item embedded in invoices and quotes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::de::lenient_f64;

/// One billable row on an invoice or quote.
///
/// Numeric fields deserialize leniently: a malformed quantity or price
/// reads as 0 and the row simply contributes nothing to the totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default = "new_id")]
    pub line_item_id: String,
    /// Optional short item code.
    #[serde(default)]
    pub item: Option<String>,
    pub description: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,
    /// Percentage discount, 0..=100.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount: f64,
    /// Free-text ledger account label.
    #[serde(default)]
    pub account: Option<String>,
    /// Tax rate label, resolved against the configured rate table.
    #[serde(default)]
    pub tax_rate: String,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_quantity() -> f64 {
    1.0
}

impl LineItem {
    pub fn new(description: String, quantity: f64, unit_price: f64) -> Self {
        Self {
            line_item_id: new_id(),
            item: None,
            description,
            quantity,
            unit_price,
            discount: 0.0,
            account: None,
            tax_rate: String::new(),
        }
    }
}
