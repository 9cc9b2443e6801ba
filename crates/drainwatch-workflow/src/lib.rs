//! Drainwatch Workflow - Report lifecycle and status reconciliation
//!
//! [`DrainageService`] is the entry point for every operation that reads or
//! mutates reports, remediation links and segment conditions. Mutations run
//! inside one storage unit of work each and either commit fully or not at all.

pub mod models;
pub mod query;
pub mod reconcile;
pub mod report;
pub mod service;

pub use models::{FixOutcome, ReportDetail};
pub use reconcile::{derive_condition, derive_report_status};
pub use service::DrainageService;
