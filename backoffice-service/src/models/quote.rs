//! Quote document. Same shape as an invoice, different status
//! vocabulary: a quote locks as soon as it leaves Draft.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compute::line_items::DocumentTotals;

use super::{Invoice, InvoiceStatus, LineItem, TaxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => QuoteStatus::Sent,
            "accepted" => QuoteStatus::Accepted,
            "expired" => QuoteStatus::Expired,
            _ => QuoteStatus::Draft,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            QuoteStatus::Draft => 0,
            QuoteStatus::Sent => 1,
            QuoteStatus::Accepted => 2,
            QuoteStatus::Expired => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub quote_id: String,
    pub customer_name: String,
    pub customer_id: Option<String>,
    pub status: QuoteStatus,
    #[serde(default)]
    pub tax_type: TaxType,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Set once the quote has been converted to an invoice.
    pub converted_invoice_id: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(customer_name: String, tax_type: TaxType) -> Self {
        let now = Utc::now();
        Self {
            quote_id: Uuid::new_v4().to_string(),
            customer_name,
            customer_id: None,
            status: QuoteStatus::Draft,
            tax_type,
            line_items: Vec::new(),
            subtotal: 0.0,
            total_tax: 0.0,
            total: 0.0,
            valid_until: None,
            notes: None,
            converted_invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.status == QuoteStatus::Draft
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        next.rank() > self.status.rank()
    }

    pub fn apply_totals(&mut self, totals: DocumentTotals) {
        self.subtotal = totals.subtotal;
        self.total_tax = totals.total_tax;
        self.total = totals.total;
        self.updated_at = Utc::now();
    }

    /// Build the invoice an accepted quote converts into. Line items
    /// and computed totals carry over as-is; the invoice starts Unpaid.
    pub fn to_invoice(&self) -> Invoice {
        let mut invoice = Invoice::new(self.customer_name.clone(), self.tax_type);
        invoice.customer_id = self.customer_id.clone();
        invoice.status = InvoiceStatus::Unpaid;
        invoice.line_items = self.line_items.clone();
        invoice.subtotal = self.subtotal;
        invoice.total_tax = self.total_tax;
        invoice.total = self.total;
        invoice.issue_date = Some(Utc::now().date_naive());
        invoice.notes = self.notes.clone();
        invoice
    }
}
