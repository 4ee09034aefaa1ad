pub mod metrics;
pub mod payroll;
pub mod storage;
pub mod store;

pub use metrics::{get_metrics, init_metrics};
pub use payroll::PayrollService;
pub use storage::{LocalStorage, Storage};
pub use store::{MemoryStore, MongoStore, RecordStore};
