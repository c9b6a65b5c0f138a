//! Event bus port: progress and finish notifications for observers.

use forcestop_domain::event::RunEvent;

/// Publishes run events to interested observers.
///
/// Publishing is fire-and-forget: the runner never waits for observers and
/// a missing observer is not an error.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: RunEvent);
}

impl<T: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: RunEvent) {
        (**self).publish(event);
    }
}
