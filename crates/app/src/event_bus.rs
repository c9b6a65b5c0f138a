//! In-process event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use forcestop_domain::event::RunEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). A subscriber that falls more than
/// `capacity` events behind sees [`broadcast::error::RecvError::Lagged`].
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: RunEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("run event dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forcestop_domain::event::{FinishEvent, ProgressEvent};
    use forcestop_domain::id::RunId;
    use forcestop_domain::target::TargetId;

    fn progress(run_id: RunId, current: usize) -> RunEvent {
        RunEvent::from(ProgressEvent {
            run_id,
            target: TargetId::new("com.example.mail").unwrap(),
            label: "Mail".to_string(),
            current,
            total: 2,
        })
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();
        let run_id = RunId::new();

        bus.publish(progress(run_id, 1));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, progress(run_id, 1));
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let run_id = RunId::new();

        bus.publish(RunEvent::from(FinishEvent {
            run_id,
            aborted: true,
        }));

        let r1 = rx1.recv().await.unwrap();
        let r2 = rx2.recv().await.unwrap();
        assert_eq!(r1.run_id(), run_id);
        assert_eq!(r2.run_id(), run_id);
        assert!(r1.is_terminal());
    }

    #[test]
    fn should_not_panic_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        bus.publish(progress(RunId::new(), 1));
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        let run_id = RunId::new();

        bus.publish(progress(run_id, 1));
        let mut rx = bus.subscribe();
        bus.publish(progress(run_id, 2));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, progress(run_id, 2));
    }

    #[tokio::test]
    async fn should_share_channel_between_clones() {
        let bus = InProcessEventBus::new(16);
        let publisher = bus.clone();
        let mut rx = bus.subscribe();
        let run_id = RunId::new();

        publisher.publish(progress(run_id, 1));

        assert_eq!(rx.recv().await.unwrap(), progress(run_id, 1));
    }
}
