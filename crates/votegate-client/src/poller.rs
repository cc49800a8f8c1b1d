//! Heartbeat poller.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::http::QueueClient;
use crate::status::ClientStatus;

/// Joins once, then heartbeats on a fixed cadence.
///
/// The last-known [`ClientStatus`] is published on a watch channel. Polling
/// stops for good after the first failed heartbeat.
#[derive(Debug)]
pub struct QueuePoller {
    client: QueueClient,
    interval: Duration,
    status: watch::Sender<ClientStatus>,
}

impl QueuePoller {
    /// Create a poller heartbeating every `interval`.
    pub fn new(client: QueueClient, interval: Duration) -> Self {
        let (status, _) = watch::channel(ClientStatus::Idle);
        Self {
            client,
            interval,
            status,
        }
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<ClientStatus> {
        self.status.subscribe()
    }

    /// Current status.
    pub fn status(&self) -> ClientStatus {
        self.status.borrow().clone()
    }

    /// Request admission and record the result.
    pub async fn join(&self, registration_number: &str, voting_key: &str) -> ClientResult<ClientStatus> {
        match self.client.join(registration_number, voting_key).await {
            Ok(admission) => {
                let status = ClientStatus::from_admission(admission);
                self.status.send_replace(status.clone());
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "Failed to join queue");
                self.status.send_replace(ClientStatus::Error {
                    message: "Failed to join queue".to_string(),
                });
                Err(e)
            }
        }
    }

    /// Send one heartbeat for the current token and fold in the result.
    ///
    /// Returns the new status. Does nothing when there is no token.
    pub async fn tick(&self) -> ClientStatus {
        let current = self.status.borrow().token().map(str::to_string);
        let Some(token) = current else {
            return self.status();
        };

        let result = self.client.heartbeat(&token).await;
        let next = ClientStatus::after_heartbeat(&token, result.as_ref().map(|s| *s));

        if let Err(e) = &result {
            warn!(error = %e, "Heartbeat failed");
        }
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        next
    }

    /// Heartbeat until the status turns terminal or `cancel` flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        if self.status.borrow().token().is_none() {
            return;
        }

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The join just refreshed liveness.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = self.tick().await;
                    if status.token().is_none() {
                        info!(status = ?status, "Heartbeat poller stopped");
                        return;
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Heartbeat poller cancelled");
                        return;
                    }
                }
            }
        }
    }

    /// Leave the queue or session and go idle.
    pub async fn leave(&self) -> ClientResult<()> {
        let token = self.status.borrow().token().map(str::to_string);
        if let Some(token) = token {
            self.client.leave(&token).await?;
        }
        self.status.send_replace(ClientStatus::Idle);
        Ok(())
    }
}
