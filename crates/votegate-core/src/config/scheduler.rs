//! Promotion scheduler configuration.

use serde::{Deserialize, Serialize};

/// Settings for the timer-driven promotion runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the in-process promotion runner is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between promotion cycles.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Run an early cycle when a slot is released (push wake-up).
    #[serde(default = "default_true")]
    pub wake_on_release: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_interval(),
            wake_on_release: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    15
}
