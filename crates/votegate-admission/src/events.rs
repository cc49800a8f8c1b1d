//! In-process broadcast of queue events.

use tokio::sync::broadcast;
use tracing::trace;

use votegate_core::events::QueueEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Broadcast bus for [`QueueEvent`]s.
///
/// Publishing never blocks and never fails; with no subscribers the event
/// is dropped. Slow subscribers see `RecvError::Lagged` and must fall back
/// to polling.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a bus buffering `buffer_size` events per subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self { tx }
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, event: QueueEvent) {
        if self.tx.send(event).is_err() {
            trace!("Queue event dropped, no subscribers");
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(QueueEvent::Completed {
            identity: "2021/0001".into(),
        });

        let event = rx.recv().await.unwrap();
        assert!(event.releases_slot());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.publish(QueueEvent::Reaped {
            sessions: 0,
            queue_entries: 0,
        });
    }
}
