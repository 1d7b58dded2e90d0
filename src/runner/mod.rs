//! Check execution orchestration.

pub mod audit;
pub mod summary;

pub use audit::{AuditRunner, RunOptions};
pub use summary::{CheckOutcome, OutcomeStatus, RunSummary};
