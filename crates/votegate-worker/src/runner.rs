//! Promotion runner: main loop that reaps and promotes on a timer.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time;
use tracing::{debug, info};

use votegate_admission::{EventBus, PromotionCycle};
use votegate_core::config::SchedulerConfig;
use votegate_core::events::QueueEvent;
use votegate_entity::PromotionReport;

use crate::wake::{Wake, next_release};

/// Runs promotion cycles until told to stop.
#[derive(Debug)]
pub struct PromotionRunner {
    /// The cycle to run.
    cycle: PromotionCycle,
    /// Scheduler settings.
    config: SchedulerConfig,
    /// Source of early wake-ups, if enabled.
    events: Option<EventBus>,
    /// Last finished cycle.
    reports: watch::Sender<Option<PromotionReport>>,
}

impl PromotionRunner {
    /// Create a new runner. `events` is only used when `wake_on_release` is set.
    pub fn new(cycle: PromotionCycle, config: SchedulerConfig, events: Option<EventBus>) -> Self {
        let (reports, _) = watch::channel(None);
        Self {
            cycle,
            config,
            events,
            reports,
        }
    }

    /// Watch the report of each finished cycle.
    pub fn subscribe_reports(&self) -> watch::Receiver<Option<PromotionReport>> {
        self.reports.subscribe()
    }

    /// Run cycles until the cancel signal flips to `true`.
    ///
    /// A cycle in flight when the signal arrives is allowed to finish.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let interval = Duration::from_secs(self.config.interval_seconds);
        let mut wake: Option<broadcast::Receiver<QueueEvent>> = if self.config.wake_on_release {
            self.events.as_ref().map(EventBus::subscribe)
        } else {
            None
        };

        info!(
            interval_seconds = self.config.interval_seconds,
            wake_on_release = wake.is_some(),
            "Promotion runner started"
        );

        loop {
            let report = self.cycle.run().await;
            self.reports.send_replace(Some(report));

            if *cancel.borrow() {
                break;
            }

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Promotion runner received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(interval) => {}
                woke = wait_for_release(&mut wake) => {
                    debug!(reason = ?woke, "Promotion runner woken early");
                    if woke == Wake::Closed {
                        wake = None;
                    }
                }
            }
        }

        info!("Promotion runner stopped");
    }
}

async fn wait_for_release(wake: &mut Option<broadcast::Receiver<QueueEvent>>) -> Wake {
    match wake {
        Some(rx) => next_release(rx).await,
        None => std::future::pending().await,
    }
}
