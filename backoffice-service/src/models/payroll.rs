//! Payroll run document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compute::payroll::{compute_payroll_totals, PayrollTotals};

use super::de::lenient_f64;

/// Payroll run status. Approved is optional; Paid is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Approved => "approved",
            PayrollStatus::Paid => "paid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => PayrollStatus::Approved,
            "paid" => PayrollStatus::Paid,
            _ => PayrollStatus::Draft,
        }
    }
}

/// One employee's pay components within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePayLine {
    pub employee_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub base_pay: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overtime: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bonus: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub taxes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deductions: f64,
}

impl EmployeePayLine {
    pub fn gross_pay(&self) -> f64 {
        self.base_pay + self.overtime + self.bonus
    }

    pub fn net_pay(&self) -> f64 {
        self.gross_pay() - self.taxes - self.deductions
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRun {
    #[serde(rename = "_id")]
    pub run_id: String,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: PayrollStatus,
    #[serde(default)]
    pub employees: Vec<EmployeePayLine>,
    pub gross_total: f64,
    pub taxes_total: f64,
    pub deductions_total: f64,
    pub net_total: f64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "super::de::optional_bson_datetime")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl PayrollRun {
    pub fn new(pay_period_start: NaiveDate, pay_period_end: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            pay_period_start,
            pay_period_end,
            payment_date: None,
            status: PayrollStatus::Draft,
            employees: Vec::new(),
            gross_total: 0.0,
            taxes_total: 0.0,
            deductions_total: 0.0,
            net_total: 0.0,
            created_at: now,
            updated_at: now,
            finalized_at: None,
        }
    }

    /// Rows may be added, removed and edited until the run is paid.
    pub fn is_editable(&self) -> bool {
        self.status != PayrollStatus::Paid
    }

    pub fn contains_employee(&self, employee_id: &str) -> bool {
        self.employees.iter().any(|e| e.employee_id == employee_id)
    }

    pub fn recompute_totals(&mut self) {
        let PayrollTotals {
            gross,
            taxes,
            deductions,
            net,
        } = compute_payroll_totals(&self.employees);
        self.gross_total = gross;
        self.taxes_total = taxes;
        self.deductions_total = deductions;
        self.net_total = net;
        self.updated_at = Utc::now();
    }

    /// Lock the run. Terminal: nothing on the run may change after.
    pub fn finalize(&mut self, payment_date: Option<NaiveDate>) {
        self.status = PayrollStatus::Paid;
        if payment_date.is_some() {
            self.payment_date = payment_date;
        }
        let now = Utc::now();
        self.finalized_at = Some(now);
        self.updated_at = now;
    }
}
