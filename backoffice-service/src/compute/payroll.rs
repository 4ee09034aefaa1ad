//! Payroll run aggregation.

use serde::Serialize;

use crate::models::EmployeePayLine;

use super::money::{round_currency, sanitize};

/// Run-level totals across all employee pay lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayrollTotals {
    pub gross: f64,
    pub taxes: f64,
    pub deductions: f64,
    pub net: f64,
}

/// Sum pay components across a run.
///
/// Net is derived from the summed components rather than summed
/// per-employee, so `net == gross - taxes - deductions` holds by
/// construction and cannot drift under rounding.
pub fn compute_payroll_totals(employees: &[EmployeePayLine]) -> PayrollTotals {
    let mut gross = 0.0;
    let mut taxes = 0.0;
    let mut deductions = 0.0;

    for line in employees {
        gross += sanitize(line.base_pay) + sanitize(line.overtime) + sanitize(line.bonus);
        taxes += sanitize(line.taxes);
        deductions += sanitize(line.deductions);
    }

    let gross = round_currency(gross);
    let taxes = round_currency(taxes);
    let deductions = round_currency(deductions);
    PayrollTotals {
        gross,
        taxes,
        deductions,
        net: round_currency(gross - taxes - deductions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(
        base_pay: f64,
        overtime: f64,
        bonus: f64,
        taxes: f64,
        deductions: f64,
    ) -> EmployeePayLine {
        EmployeePayLine {
            employee_id: uuid::Uuid::new_v4().to_string(),
            name: "Driver".to_string(),
            base_pay,
            overtime,
            bonus,
            taxes,
            deductions,
        }
    }

    #[test]
    fn empty_run_totals_are_zero() {
        let totals = compute_payroll_totals(&[]);
        assert_eq!(totals.gross, 0.0);
        assert_eq!(totals.net, 0.0);
    }

    #[test]
    fn worked_example() {
        let employees = vec![
            line(2500.0, 250.0, 0.0, 550.0, 50.0),
            line(2400.0, 100.0, 150.0, 520.0, 50.0),
        ];
        let totals = compute_payroll_totals(&employees);
        assert_eq!(totals.gross, 5400.0);
        assert_eq!(totals.taxes, 1070.0);
        assert_eq!(totals.deductions, 100.0);
        assert_eq!(totals.net, 4230.0);
    }

    #[test]
    fn per_line_gross_and_net() {
        let l = line(2500.0, 250.0, 0.0, 550.0, 50.0);
        assert_eq!(l.gross_pay(), 2750.0);
        assert_eq!(l.net_pay(), 2150.0);
    }

    #[test]
    fn net_total_matches_summed_components() {
        let employees = vec![
            line(1234.56, 78.9, 0.01, 200.2, 10.1),
            line(987.65, 0.0, 43.21, 150.15, 5.05),
            line(3000.0, 120.33, 0.0, 601.07, 25.0),
        ];
        let totals = compute_payroll_totals(&employees);
        assert!((totals.net - (totals.gross - totals.taxes - totals.deductions)).abs() < 1e-9);

        // The per-employee path agrees with the component path.
        let per_line: f64 = employees.iter().map(|e| e.net_pay()).sum();
        assert!((totals.net - round_currency(per_line)).abs() < 1e-9);
    }

    #[test]
    fn order_does_not_matter() {
        let a = vec![
            line(2500.0, 250.0, 0.0, 550.0, 50.0),
            line(2400.0, 100.0, 150.0, 520.0, 50.0),
        ];
        let b: Vec<_> = a.iter().rev().cloned().collect();
        assert_eq!(compute_payroll_totals(&a), compute_payroll_totals(&b));
    }
}
