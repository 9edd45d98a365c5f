//! In-process change notifications.

use dripcam_core::ImageEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcast channel for record snapshots.
///
/// Delivery is at-most-once with no replay: a subscriber only sees events
/// published after it subscribed, and one that falls more than the channel
/// capacity behind gets `RecvError::Lagged` and loses the oldest events.
/// Publishers never block.
#[derive(Debug, Clone)]
pub struct ImageEvents {
    sender: broadcast::Sender<ImageEvent>,
}

impl ImageEvents {
    /// Create a channel buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Returns the number of subscribers reached. Zero subscribers is fine.
    pub fn publish(&self, event: ImageEvent) -> usize {
        let id = event.image.id;
        let status = event.image.status;
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(id, %status, receivers, "Published image event");
                receivers
            }
            Err(_) => {
                trace!(id, %status, "No subscribers for image event");
                0
            }
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ImageEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ImageEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dripcam_core::ImageRequest;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn event(id: i64) -> ImageEvent {
        ImageEvent::created(&ImageRequest::new_pending(id, "webcam/a.jpg", Utc::now()))
    }

    #[test]
    fn test_publish_without_subscribers() {
        let events = ImageEvents::default();
        assert_eq!(events.publish(event(1)), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_only_new_events() {
        let events = ImageEvents::default();
        let mut early = events.subscribe();
        events.publish(event(1));

        let mut late = events.subscribe();
        assert_eq!(events.publish(event(2)), 2);

        assert_eq!(early.recv().await.unwrap().image.id, 1);
        assert_eq!(early.recv().await.unwrap().image.id, 2);
        assert_eq!(late.recv().await.unwrap().image.id, 2);
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let events = ImageEvents::new(2);
        let mut rx = events.subscribe();
        for id in 1..=4 {
            events.publish(event(id));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(2))));
        assert_eq!(rx.recv().await.unwrap().image.id, 3);
    }
}
