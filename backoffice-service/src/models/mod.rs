//! Document models for backoffice-service.

pub mod de;
pub mod employee;
pub mod invoice;
pub mod leave;
pub mod line_item;
pub mod payroll;
pub mod quote;
pub mod tax;
pub mod trip;

pub use employee::Employee;
pub use invoice::{Invoice, InvoiceStatus, TaxType};
pub use leave::{LeaveRequest, LeaveStatus};
pub use line_item::LineItem;
pub use payroll::{EmployeePayLine, PayrollRun, PayrollStatus};
pub use quote::{Quote, QuoteStatus};
pub use tax::{TaxRateEntry, TaxTable};
pub use trip::{Trip, TripStatus};
