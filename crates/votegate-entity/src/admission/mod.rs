//! Value objects returned by the admission core.

pub mod ledger;
pub mod outcome;
pub mod report;

pub use ledger::LedgerState;
pub use outcome::{Admission, AdmissionOutcome, AdmissionPath, HeartbeatStatus};
pub use report::{PromotionReport, ReapSummary};
