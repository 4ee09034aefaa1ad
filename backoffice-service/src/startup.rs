use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::BackofficeConfig;
use crate::handlers;
use crate::models::TaxTable;
use crate::services::payroll::PayrollService;
use crate::services::storage::Storage;
use crate::services::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: BackofficeConfig,
    pub store: Arc<dyn RecordStore>,
    pub storage: Arc<dyn Storage>,
    pub tax_table: TaxTable,
    pub payroll: PayrollService,
}

impl AppState {
    pub fn new(
        config: BackofficeConfig,
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn Storage>,
        tax_table: TaxTable,
    ) -> Self {
        let payroll = PayrollService::new(store.clone(), (&config.payroll).into());
        Self {
            config,
            store,
            storage,
            tax_table,
            payroll,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::readiness))
        .route("/metrics", get(handlers::health::metrics))
        .route(
            "/invoices",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route(
            "/invoices/:id",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route(
            "/invoices/:id/line-items",
            post(handlers::invoices::add_line_item),
        )
        .route(
            "/invoices/:id/line-items/:line_item_id",
            put(handlers::invoices::update_line_item)
                .delete(handlers::invoices::remove_line_item),
        )
        .route(
            "/invoices/:id/status",
            post(handlers::invoices::update_status),
        )
        .route(
            "/invoices/:id/attachments",
            post(handlers::invoices::upload_attachment),
        )
        .route(
            "/quotes",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route(
            "/quotes/:id",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/quotes/:id/line-items", post(handlers::quotes::add_line_item))
        .route(
            "/quotes/:id/line-items/:line_item_id",
            put(handlers::quotes::update_line_item).delete(handlers::quotes::remove_line_item),
        )
        .route("/quotes/:id/status", post(handlers::quotes::update_status))
        .route("/quotes/:id/convert", post(handlers::quotes::convert_quote))
        .route(
            "/employees",
            post(handlers::employees::create_employee).get(handlers::employees::list_employees),
        )
        .route(
            "/employees/:id",
            get(handlers::employees::get_employee).put(handlers::employees::update_employee),
        )
        .route(
            "/trips",
            post(handlers::trips::create_trip).get(handlers::trips::list_trips),
        )
        .route(
            "/leave-requests",
            post(handlers::leave::create_leave_request).get(handlers::leave::list_leave_requests),
        )
        .route(
            "/leave-requests/:id/status",
            post(handlers::leave::update_status),
        )
        .route(
            "/payroll-runs",
            post(handlers::payroll::create_run).get(handlers::payroll::list_runs),
        )
        .route("/payroll-runs/:id", get(handlers::payroll::get_run))
        .route(
            "/payroll-runs/:id/employees",
            post(handlers::payroll::add_employees),
        )
        .route(
            "/payroll-runs/:id/employees/:employee_id",
            put(handlers::payroll::update_employee).delete(handlers::payroll::remove_employee),
        )
        .route("/payroll-runs/:id/approve", post(handlers::payroll::approve_run))
        .route(
            "/payroll-runs/:id/finalize",
            post(handlers::payroll::finalize_run),
        )
        .route(
            "/reports/dashboard",
            get(handlers::reports::dashboard_summary),
        )
        .route(
            "/reports/payroll-trend",
            get(handlers::reports::payroll_trend),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| tracing::error!("Failed to install Ctrl+C handler: {}", e));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
