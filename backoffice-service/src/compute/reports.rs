//! Derived dashboard and report rollups.

use chrono::Datelike;
use serde::Serialize;

use crate::models::{Invoice, InvoiceStatus, LeaveRequest, LeaveStatus, PayrollRun, PayrollStatus};

use super::money::round_currency;

/// Revenue recognized per month of one calendar year, from paid
/// invoices only. Index 0 is January.
pub fn monthly_revenue(invoices: &[Invoice], year: i32) -> [f64; 12] {
    let mut buckets = [0.0f64; 12];
    for invoice in invoices {
        if invoice.status != InvoiceStatus::Paid {
            continue;
        }
        let date = invoice
            .paid_date
            .or(invoice.issue_date)
            .unwrap_or_else(|| invoice.created_at.date_naive());
        if date.year() == year {
            buckets[date.month0() as usize] += invoice.total;
        }
    }
    for bucket in &mut buckets {
        *bucket = round_currency(*bucket);
    }
    buckets
}

/// Amount still owed across unpaid and overdue invoices.
pub fn outstanding_total(invoices: &[Invoice]) -> f64 {
    round_currency(
        invoices
            .iter()
            .filter(|i| matches!(i.status, InvoiceStatus::Unpaid | InvoiceStatus::Overdue))
            .map(|i| i.total)
            .sum(),
    )
}

pub fn pending_leave_count(requests: &[LeaveRequest]) -> usize {
    requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Pending)
        .count()
}

/// One point of the payroll cost series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayrollTrendPoint {
    pub period_end: chrono::NaiveDate,
    pub gross_total: f64,
    pub net_total: f64,
}

/// Chronological net-pay series over paid payroll runs.
pub fn payroll_trend(runs: &[PayrollRun]) -> Vec<PayrollTrendPoint> {
    let mut points: Vec<PayrollTrendPoint> = runs
        .iter()
        .filter(|r| r.status == PayrollStatus::Paid)
        .map(|r| PayrollTrendPoint {
            period_end: r.pay_period_end,
            gross_total: r.gross_total,
            net_total: r.net_total,
        })
        .collect();
    points.sort_by_key(|p| p.period_end);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxType;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn paid_invoice(total: f64, paid: &str) -> Invoice {
        let mut inv = Invoice::new("Customer".to_string(), TaxType::Exclusive);
        inv.status = InvoiceStatus::Paid;
        inv.total = total;
        inv.paid_date = Some(date(paid));
        inv
    }

    #[test]
    fn monthly_revenue_buckets_paid_invoices_only() {
        let mut unpaid = Invoice::new("Customer".to_string(), TaxType::Exclusive);
        unpaid.status = InvoiceStatus::Unpaid;
        unpaid.total = 999.0;
        unpaid.issue_date = Some(date("2026-01-15"));

        let invoices = vec![
            paid_invoice(100.0, "2026-01-10"),
            paid_invoice(250.5, "2026-01-20"),
            paid_invoice(80.0, "2026-03-05"),
            paid_invoice(500.0, "2025-12-31"),
            unpaid,
        ];

        let revenue = monthly_revenue(&invoices, 2026);
        assert_eq!(revenue[0], 350.5);
        assert_eq!(revenue[1], 0.0);
        assert_eq!(revenue[2], 80.0);
        assert_eq!(revenue.iter().sum::<f64>(), 430.5);
    }

    #[test]
    fn outstanding_skips_paid_and_draft() {
        let mut draft = Invoice::new("Customer".to_string(), TaxType::Exclusive);
        draft.total = 10.0;
        let mut unpaid = Invoice::new("Customer".to_string(), TaxType::Exclusive);
        unpaid.status = InvoiceStatus::Unpaid;
        unpaid.total = 40.0;
        let mut overdue = Invoice::new("Customer".to_string(), TaxType::Exclusive);
        overdue.status = InvoiceStatus::Overdue;
        overdue.total = 60.0;
        let paid = paid_invoice(1000.0, "2026-01-01");

        assert_eq!(outstanding_total(&[draft, unpaid, overdue, paid]), 100.0);
    }

    #[test]
    fn payroll_trend_is_chronological_and_paid_only() {
        let mut march = PayrollRun::new(date("2026-03-01"), date("2026-03-31"));
        march.status = PayrollStatus::Paid;
        march.net_total = 4230.0;
        let mut january = PayrollRun::new(date("2026-01-01"), date("2026-01-31"));
        january.status = PayrollStatus::Paid;
        january.net_total = 4100.0;
        let draft = PayrollRun::new(date("2026-04-01"), date("2026-04-30"));

        let points = payroll_trend(&[march, january, draft]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].period_end, date("2026-01-31"));
        assert_eq!(points[1].net_total, 4230.0);
    }

    #[test]
    fn pending_leave_counting() {
        let mut approved = LeaveRequest::new(
            "emp-1".to_string(),
            "annual".to_string(),
            date("2026-05-01"),
            date("2026-05-05"),
        );
        approved.status = LeaveStatus::Approved;
        let pending = LeaveRequest::new(
            "emp-2".to_string(),
            "sick".to_string(),
            date("2026-05-02"),
            date("2026-05-03"),
        );
        assert_eq!(pending_leave_count(&[approved, pending]), 1);
    }
}
