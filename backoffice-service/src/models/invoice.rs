//! Invoice document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compute::line_items::DocumentTotals;

use super::LineItem;

/// Invoice status. Transitions are one-way forward, driven by explicit
/// user actions; an invoice is never marked Overdue automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Unpaid,
    Overdue,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "unpaid" => InvoiceStatus::Unpaid,
            "overdue" => InvoiceStatus::Overdue,
            "paid" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Draft,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            InvoiceStatus::Draft => 0,
            InvoiceStatus::Unpaid => 1,
            InvoiceStatus::Overdue => 2,
            InvoiceStatus::Paid => 3,
        }
    }
}

/// How line prices relate to tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Exclusive,
    Inclusive,
    NoTax,
}

impl Default for TaxType {
    fn default() -> Self {
        TaxType::Exclusive
    }
}

/// Invoice with embedded line items and computed totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub invoice_id: String,
    pub customer_name: String,
    pub customer_id: Option<String>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub tax_type: TaxType,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Storage locators of attached receipts/documents.
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(customer_name: String, tax_type: TaxType) -> Self {
        let now = Utc::now();
        Self {
            invoice_id: Uuid::new_v4().to_string(),
            customer_name,
            customer_id: None,
            status: InvoiceStatus::Draft,
            tax_type,
            line_items: Vec::new(),
            subtotal: 0.0,
            total_tax: 0.0,
            total: 0.0,
            issue_date: None,
            due_date: None,
            paid_date: None,
            notes: None,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Line items and header fields stay editable until the invoice is
    /// paid.
    pub fn is_editable(&self) -> bool {
        self.status != InvoiceStatus::Paid
    }

    /// Status moves forward only.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        next.rank() > self.status.rank()
    }

    pub fn apply_totals(&mut self, totals: DocumentTotals) {
        self.subtotal = totals.subtotal;
        self.total_tax = totals.total_tax;
        self.total = totals.total;
        self.updated_at = Utc::now();
    }
}
