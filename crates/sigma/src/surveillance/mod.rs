//! Aggregation engine for monthly toddler nutrition reports.
//!
//! Every calculator is a pure function over borrowed slices. Results are
//! rebuilt from scratch on each call and nothing is cached.

pub mod ciaf;
pub mod compliance;
pub mod completeness;
pub mod domain;
pub mod grouping;
pub mod growth;
pub mod indicators;
pub mod reference;
pub mod report;
pub mod router;
pub mod trend;

#[cfg(test)]
mod tests;

pub use domain::{
    PeriodError, RecordField, ReferenceUnit, ReportingPeriod, ReportingRole, TransactionRecord,
    MANDATORY_FIELDS,
};
pub use reference::ReferenceResolver;
pub use report::{DashboardInput, DashboardReport};
pub use router::analytics_router;

/// `part / whole * 100`, or 0 when `whole` is not positive. Never clamped.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && whole.is_finite() {
        part / whole * 100.0
    } else {
        0.0
    }
}
