//! In-memory record store over `DashMap`. Backs the test suite and the
//! standalone demo mode; the trait contract is identical to Mongo's.

use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;

use crate::models::{
    Employee, Invoice, InvoiceStatus, LeaveRequest, PayrollRun, Quote, QuoteStatus, Trip,
};

use super::RecordStore;

#[derive(Default)]
pub struct MemoryStore {
    invoices: DashMap<String, Invoice>,
    quotes: DashMap<String, Quote>,
    employees: DashMap<String, Employee>,
    trips: DashMap<String, Trip>,
    payroll_runs: DashMap<String, PayrollRun>,
    leave_requests: DashMap<String, LeaveRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.invoices
            .insert(invoice.invoice_id.clone(), invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        Ok(self.invoices.get(id).map(|e| e.value().clone()))
    }

    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, AppError> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .map(|e| e.value().clone())
            .filter(|i| status.map_or(true, |s| i.status == s))
            .collect();
        invoices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(invoices)
    }

    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.invoices.remove(id).is_some())
    }

    async fn put_quote(&self, quote: &Quote) -> Result<(), AppError> {
        self.quotes.insert(quote.quote_id.clone(), quote.clone());
        Ok(())
    }

    async fn get_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        Ok(self.quotes.get(id).map(|e| e.value().clone()))
    }

    async fn list_quotes(&self, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError> {
        let mut quotes: Vec<Quote> = self
            .quotes
            .iter()
            .map(|e| e.value().clone())
            .filter(|q| status.map_or(true, |s| q.status == s))
            .collect();
        quotes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(quotes)
    }

    async fn delete_quote(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.quotes.remove(id).is_some())
    }

    async fn put_employee(&self, employee: &Employee) -> Result<(), AppError> {
        self.employees
            .insert(employee.employee_id.clone(), employee.clone());
        Ok(())
    }

    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        Ok(self.employees.get(id).map(|e| e.value().clone()))
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let mut employees: Vec<Employee> =
            self.employees.iter().map(|e| e.value().clone()).collect();
        employees.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(employees)
    }

    async fn put_trip(&self, trip: &Trip) -> Result<(), AppError> {
        self.trips.insert(trip.trip_id.clone(), trip.clone());
        Ok(())
    }

    async fn list_trips(&self, driver_id: Option<&str>) -> Result<Vec<Trip>, AppError> {
        let mut trips: Vec<Trip> = self
            .trips
            .iter()
            .map(|e| e.value().clone())
            .filter(|t| driver_id.map_or(true, |d| t.driver_id == d))
            .collect();
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }

    async fn put_payroll_run(&self, run: &PayrollRun) -> Result<(), AppError> {
        self.payroll_runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn get_payroll_run(&self, id: &str) -> Result<Option<PayrollRun>, AppError> {
        Ok(self.payroll_runs.get(id).map(|e| e.value().clone()))
    }

    async fn list_payroll_runs(&self) -> Result<Vec<PayrollRun>, AppError> {
        let mut runs: Vec<PayrollRun> = self
            .payroll_runs
            .iter()
            .map(|e| e.value().clone())
            .collect();
        runs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(runs)
    }

    async fn put_leave_request(&self, request: &LeaveRequest) -> Result<(), AppError> {
        self.leave_requests
            .insert(request.leave_id.clone(), request.clone());
        Ok(())
    }

    async fn get_leave_request(&self, id: &str) -> Result<Option<LeaveRequest>, AppError> {
        Ok(self.leave_requests.get(id).map(|e| e.value().clone()))
    }

    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, AppError> {
        let mut requests: Vec<LeaveRequest> = self
            .leave_requests
            .iter()
            .map(|e| e.value().clone())
            .collect();
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(requests)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
