pub mod employees;
pub mod health;
pub mod invoices;
pub mod leave;
pub mod payroll;
pub mod quotes;
pub mod reports;
pub mod trips;
