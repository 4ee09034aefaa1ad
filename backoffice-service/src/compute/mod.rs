//! Pure computation core: money arithmetic, document and payroll
//! aggregation, overtime derivation, report rollups.
//!
//! Everything in here is synchronous and side-effect free; callers take
//! a full snapshot of the records, compute fresh figures, and persist
//! them where they see fit. Recomputing on every change event is cheap
//! and always yields the same result for the same inputs.

pub mod line_items;
pub mod money;
pub mod overtime;
pub mod payroll;
pub mod reports;
