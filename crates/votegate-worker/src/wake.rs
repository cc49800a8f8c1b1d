//! Early wake-up from queue events.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use votegate_core::events::QueueEvent;

/// Why the runner was woken ahead of schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A slot was released.
    Released,
    /// Events were dropped; a release may have been among them.
    Lagged,
    /// The bus is gone; no more early wake-ups will arrive.
    Closed,
}

/// Wait for the next event that could let a queued entry in.
pub async fn next_release(rx: &mut broadcast::Receiver<QueueEvent>) -> Wake {
    loop {
        match rx.recv().await {
            Ok(event) if event.releases_slot() => {
                debug!(event = ?event, "Slot released");
                return Wake::Released;
            }
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped = skipped, "Queue event subscriber lagged");
                return Wake::Lagged;
            }
            Err(RecvError::Closed) => return Wake::Closed,
        }
    }
}
