//! Run a single promotion cycle.

use serde::Serialize;
use tabled::Tabled;

use votegate_core::AppResult;
use votegate_core::config::AppConfig;
use votegate_entity::PromotionReport;

use crate::output::{self, OutputFormat};

/// Promotion report display row
#[derive(Debug, Serialize, Tabled)]
struct ReportRow {
    /// Queue entries promoted
    promoted: u32,
    /// Expired sessions removed
    reaped_sessions: u64,
    /// Expired queue entries removed
    reaped_queue_entries: u64,
    /// Cut short by a storage failure
    aborted: bool,
    /// When the cycle ran
    timestamp: String,
}

impl From<&PromotionReport> for ReportRow {
    fn from(report: &PromotionReport) -> Self {
        Self {
            promoted: report.promoted,
            reaped_sessions: report.reaped_sessions,
            reaped_queue_entries: report.reaped_queue_entries,
            aborted: report.aborted,
            timestamp: report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute the cycle command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let state = super::open_state(config).await?;
    let report = state.promotion.run().await;

    output::print_list(&[ReportRow::from(&report)], format);
    if report.aborted {
        output::print_warning("Cycle aborted early; see the server log for the storage error.");
    }
    Ok(())
}
