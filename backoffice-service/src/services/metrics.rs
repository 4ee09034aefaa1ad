//! Prometheus metrics for backoffice-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Invoice counter by status transition.
pub static INVOICES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_invoices_total",
        "Total number of invoices by status",
        &["status"] // draft, unpaid, overdue, paid
    )
    .expect("Failed to register invoices_total")
});

/// Payroll run counter by status transition.
pub static PAYROLL_RUNS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_payroll_runs_total",
        "Total number of payroll runs by status",
        &["status"] // draft, approved, paid
    )
    .expect("Failed to register payroll_runs_total")
});

/// Totals recomputation counter by owning document type.
pub static TOTALS_RECOMPUTED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_totals_recomputed_total",
        "Number of aggregate recomputations by document type",
        &["document"] // invoice, quote, payroll_run
    )
    .expect("Failed to register totals_recomputed")
});

/// Record store operation duration histogram.
pub static STORE_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "backoffice_store_op_duration_seconds",
        "Record store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register store_op_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&INVOICES_TOTAL);
    Lazy::force(&PAYROLL_RUNS_TOTAL);
    Lazy::force(&TOTALS_RECOMPUTED);
    Lazy::force(&STORE_OP_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
