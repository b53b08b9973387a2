//! Status event fan-out

use podsync_core::StatusEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcasts [`StatusEvent`]s to every subscriber
///
/// Publishing never blocks. Subscribers that fall behind lose the oldest
/// events (`RecvError::Lagged`) rather than stalling the controller.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<StatusEvent>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn publish(&self, event: StatusEvent) {
        trace!(event = event.name(), "Publishing status event");
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = NotificationHub::new(4);
        hub.publish(StatusEvent::InitDone);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_events_in_order() {
        let hub = NotificationHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish(StatusEvent::progress(50));
        hub.publish(StatusEvent::progress(100));

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap(), StatusEvent::Progress { percent: 50 });
            assert_eq!(rx.recv().await.unwrap(), StatusEvent::Progress { percent: 100 });
        }
    }
}
