//! Show capacity and queue counts.

use serde::Serialize;
use tabled::Tabled;

use votegate_core::AppResult;
use votegate_core::config::AppConfig;
use votegate_entity::LedgerState;

use crate::output::{self, OutputFormat};

/// Ledger display row
#[derive(Debug, Serialize, Tabled)]
struct LedgerRow {
    /// Configured capacity
    capacity: u32,
    /// Live sessions
    active: u32,
    /// Free slots
    available: u32,
    /// Waiting entries
    queued: u32,
    /// Next position to be promoted
    head: String,
    /// Most recently assigned live position
    tail: String,
}

fn position(p: Option<i64>) -> String {
    p.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

impl From<&LedgerState> for LedgerRow {
    fn from(state: &LedgerState) -> Self {
        Self {
            capacity: state.capacity,
            active: state.active,
            available: state.available(),
            queued: state.queued,
            head: position(state.head_position),
            tail: position(state.tail_position),
        }
    }
}

/// Execute the status command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let state = super::open_state(config).await?;
    let ledger = state.ledger.state().await?;

    output::print_list(&[LedgerRow::from(&ledger)], format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_ledger_row_renders_missing_positions() {
        let state = LedgerState {
            capacity: 3,
            active: 3,
            queued: 0,
            head_position: None,
            tail_position: None,
            observed_at: Utc::now(),
        };
        let row = LedgerRow::from(&state);
        assert_eq!(row.available, 0);
        assert_eq!(row.head, "-");
    }
}
