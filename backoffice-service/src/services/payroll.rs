//! Payroll run orchestration.
//!
//! Handlers call into this service rather than touching the store
//! directly, because adding employees to a run fans out into employee
//! and trip lookups that have their own failure rules: a failed trip
//! lookup degrades to zero overtime, a missing employee fails only that
//! row, and neither aborts the batch.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use service_core::error::AppError;

use crate::compute::money::round_currency;
use crate::compute::overtime::overtime_for_driver;
use crate::models::{Employee, EmployeePayLine, PayrollRun};
use crate::services::metrics::{PAYROLL_RUNS_TOTAL, TOTALS_RECOMPUTED};
use crate::services::store::RecordStore;

/// Defaults applied when a pay line is first built from an employee
/// record. All of them are editable per line afterwards.
#[derive(Debug, Clone)]
pub struct PayrollDefaults {
    /// Overtime pay per delivered kilometre.
    pub overtime_rate_per_km: f64,
    /// Base pay used when the employee record carries none.
    pub fallback_base_pay: f64,
    /// Initial tax estimate as a percentage of base pay.
    pub tax_percent_of_base: f64,
    /// Initial flat deduction per pay line.
    pub flat_deduction: f64,
}

impl Default for PayrollDefaults {
    fn default() -> Self {
        Self {
            overtime_rate_per_km: 0.45,
            fallback_base_pay: 0.0,
            tax_percent_of_base: 0.0,
            flat_deduction: 0.0,
        }
    }
}

/// Per-employee result of a bulk add. A batch response carries one of
/// these for every requested id, succeeded or not.
#[derive(Debug, Clone, Serialize)]
pub struct AddEmployeeOutcome {
    pub employee_id: String,
    pub added: bool,
    pub overtime: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Editable fields on an existing pay line. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct PayLineUpdate {
    pub base_pay: Option<f64>,
    pub overtime: Option<f64>,
    pub bonus: Option<f64>,
    pub taxes: Option<f64>,
    pub deductions: Option<f64>,
}

#[derive(Clone)]
pub struct PayrollService {
    store: Arc<dyn RecordStore>,
    defaults: PayrollDefaults,
}

impl PayrollService {
    pub fn new(store: Arc<dyn RecordStore>, defaults: PayrollDefaults) -> Self {
        Self { store, defaults }
    }

    #[instrument(skip(self))]
    pub async fn create_run(
        &self,
        pay_period_start: NaiveDate,
        pay_period_end: NaiveDate,
    ) -> Result<PayrollRun, AppError> {
        if pay_period_end < pay_period_start {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Pay period end must not precede its start"
            )));
        }
        let run = PayrollRun::new(pay_period_start, pay_period_end);
        self.store.put_payroll_run(&run).await?;
        PAYROLL_RUNS_TOTAL.with_label_values(&["draft"]).inc();
        info!(run_id = %run.run_id, "Created payroll run");
        Ok(run)
    }

    /// Add a batch of employees to an editable run. Duplicate ids in the
    /// request and ids already on the run are skipped, each with an
    /// explanatory outcome rather than an error for the whole batch.
    #[instrument(skip(self, employee_ids), fields(run_id = %run_id, count = employee_ids.len()))]
    pub async fn add_employees(
        &self,
        run_id: &str,
        employee_ids: &[String],
    ) -> Result<(PayrollRun, Vec<AddEmployeeOutcome>), AppError> {
        let mut run = self.require_editable(run_id).await?;

        let mut seen: Vec<&str> = Vec::new();
        let mut outcomes: Vec<AddEmployeeOutcome> = Vec::new();
        let mut to_fetch: Vec<String> = Vec::new();

        for id in employee_ids {
            if seen.contains(&id.as_str()) || run.contains_employee(id) {
                outcomes.push(AddEmployeeOutcome {
                    employee_id: id.clone(),
                    added: false,
                    overtime: 0.0,
                    error: Some("Employee already on this run".to_string()),
                });
                continue;
            }
            seen.push(id);
            to_fetch.push(id.clone());
        }

        let lines = join_all(
            to_fetch
                .iter()
                .map(|id| self.build_pay_line(id, run.pay_period_start, run.pay_period_end)),
        )
        .await;

        for (id, result) in to_fetch.into_iter().zip(lines) {
            match result {
                Ok(line) => {
                    outcomes.push(AddEmployeeOutcome {
                        employee_id: id,
                        added: true,
                        overtime: line.overtime,
                        error: None,
                    });
                    run.employees.push(line);
                }
                Err(e) => {
                    warn!(employee_id = %id, error = %e, "Skipping employee in payroll batch");
                    outcomes.push(AddEmployeeOutcome {
                        employee_id: id,
                        added: false,
                        overtime: 0.0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        run.recompute_totals();
        TOTALS_RECOMPUTED.with_label_values(&["payroll_run"]).inc();
        self.store.put_payroll_run(&run).await?;
        Ok((run, outcomes))
    }

    /// Fetch one employee and derive their initial pay line. A trip
    /// lookup failure is downgraded to zero overtime; a missing
    /// employee record fails the line.
    async fn build_pay_line(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<EmployeePayLine, AppError> {
        let employee = self
            .store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Employee {} not found", employee_id))
            })?;

        let overtime = match self.store.list_trips(Some(employee_id)).await {
            Ok(trips) => overtime_for_driver(
                employee_id,
                period_start,
                period_end,
                self.defaults.overtime_rate_per_km,
                &trips,
            ),
            Err(e) => {
                warn!(employee_id = %employee_id, error = %e,
                    "Trip lookup failed; defaulting overtime to 0");
                0.0
            }
        };

        Ok(self.pay_line_for(&employee, overtime))
    }

    fn pay_line_for(&self, employee: &Employee, overtime: f64) -> EmployeePayLine {
        let base_pay = if employee.base_pay > 0.0 {
            employee.base_pay
        } else {
            self.defaults.fallback_base_pay
        };
        let taxes = round_currency(base_pay * self.defaults.tax_percent_of_base / 100.0);
        EmployeePayLine {
            employee_id: employee.employee_id.clone(),
            name: employee.name.clone(),
            base_pay,
            overtime,
            bonus: 0.0,
            taxes,
            deductions: self.defaults.flat_deduction,
        }
    }

    #[instrument(skip(self, update), fields(run_id = %run_id, employee_id = %employee_id))]
    pub async fn update_employee(
        &self,
        run_id: &str,
        employee_id: &str,
        update: PayLineUpdate,
    ) -> Result<PayrollRun, AppError> {
        let mut run = self.require_editable(run_id).await?;
        let line = run
            .employees
            .iter_mut()
            .find(|e| e.employee_id == employee_id)
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Employee {} is not on this run",
                    employee_id
                ))
            })?;

        if let Some(v) = update.base_pay {
            line.base_pay = v;
        }
        if let Some(v) = update.overtime {
            line.overtime = v;
        }
        if let Some(v) = update.bonus {
            line.bonus = v;
        }
        if let Some(v) = update.taxes {
            line.taxes = v;
        }
        if let Some(v) = update.deductions {
            line.deductions = v;
        }

        run.recompute_totals();
        TOTALS_RECOMPUTED.with_label_values(&["payroll_run"]).inc();
        self.store.put_payroll_run(&run).await?;
        Ok(run)
    }

    #[instrument(skip(self), fields(run_id = %run_id, employee_id = %employee_id))]
    pub async fn remove_employee(
        &self,
        run_id: &str,
        employee_id: &str,
    ) -> Result<PayrollRun, AppError> {
        let mut run = self.require_editable(run_id).await?;
        let before = run.employees.len();
        run.employees.retain(|e| e.employee_id != employee_id);
        if run.employees.len() == before {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Employee {} is not on this run",
                employee_id
            )));
        }

        run.recompute_totals();
        TOTALS_RECOMPUTED.with_label_values(&["payroll_run"]).inc();
        self.store.put_payroll_run(&run).await?;
        Ok(run)
    }

    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn approve(&self, run_id: &str) -> Result<PayrollRun, AppError> {
        let mut run = self.require_editable(run_id).await?;
        run.status = crate::models::PayrollStatus::Approved;
        run.updated_at = chrono::Utc::now();
        self.store.put_payroll_run(&run).await?;
        PAYROLL_RUNS_TOTAL.with_label_values(&["approved"]).inc();
        Ok(run)
    }

    /// Mark the run paid. The run locks for good; any later mutation
    /// attempt is rejected by `require_editable`.
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn finalize(
        &self,
        run_id: &str,
        payment_date: Option<NaiveDate>,
    ) -> Result<PayrollRun, AppError> {
        let mut run = self.require_editable(run_id).await?;
        run.recompute_totals();
        run.finalize(payment_date);
        self.store.put_payroll_run(&run).await?;
        PAYROLL_RUNS_TOTAL.with_label_values(&["paid"]).inc();
        info!(run_id = %run.run_id, net_total = run.net_total, "Finalized payroll run");
        Ok(run)
    }

    async fn require_editable(&self, run_id: &str) -> Result<PayrollRun, AppError> {
        let run = self
            .store
            .get_payroll_run(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payroll run {} not found", run_id)))?;
        if !run.is_editable() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Paid payroll runs cannot be modified"
            )));
        }
        Ok(run)
    }
}
