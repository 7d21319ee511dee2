//! Output module
//!
//! User-facing output of a run: the print-mode URL listing, audit report lines
//! and the end-of-run summary.

mod report;
mod stats;

pub use report::{format_audit_line, write_url_listing, AuditLog, NO_STATUS};
pub use stats::{log_summary, PrimeStats, PrimeSummary};
