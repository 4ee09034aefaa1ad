//! Record store boundary.
//!
//! The aggregation core never talks to a database directly; it goes
//! through this trait, constructed once at startup and passed by
//! reference through `AppState`. Production runs on MongoDB; the test
//! suite and the demo backend run on the in-memory implementation.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{
    Employee, Invoice, InvoiceStatus, LeaveRequest, PayrollRun, Quote, QuoteStatus, Trip,
};

/// Generic per-entity document store: get / list / put / delete.
/// `put` upserts the full document (last write wins; there is no
/// version check on these records).
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Invoices
    async fn put_invoice(&self, invoice: &Invoice) -> Result<(), AppError>;
    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError>;
    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, AppError>;
    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError>;

    // Quotes
    async fn put_quote(&self, quote: &Quote) -> Result<(), AppError>;
    async fn get_quote(&self, id: &str) -> Result<Option<Quote>, AppError>;
    async fn list_quotes(&self, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError>;
    async fn delete_quote(&self, id: &str) -> Result<bool, AppError>;

    // Employees
    async fn put_employee(&self, employee: &Employee) -> Result<(), AppError>;
    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError>;
    async fn list_employees(&self) -> Result<Vec<Employee>, AppError>;

    // Trips
    async fn put_trip(&self, trip: &Trip) -> Result<(), AppError>;
    async fn list_trips(&self, driver_id: Option<&str>) -> Result<Vec<Trip>, AppError>;

    // Payroll runs
    async fn put_payroll_run(&self, run: &PayrollRun) -> Result<(), AppError>;
    async fn get_payroll_run(&self, id: &str) -> Result<Option<PayrollRun>, AppError>;
    async fn list_payroll_runs(&self) -> Result<Vec<PayrollRun>, AppError>;

    // Leave requests
    async fn put_leave_request(&self, request: &LeaveRequest) -> Result<(), AppError>;
    async fn get_leave_request(&self, id: &str) -> Result<Option<LeaveRequest>, AppError>;
    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
