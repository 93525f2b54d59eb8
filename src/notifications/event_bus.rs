//! In-process booking event bus over a tokio broadcast channel.
//!
//! Slow subscribers skip what they missed rather than blocking publishers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::events::{Event, EventMessage};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Broadcast `event`; returns how many subscribers received it.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let booking_id = message.event.booking_id();

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(event_type, booking_id, delivered, "Booking event published");
        delivered
    }

    pub fn subscribe(&self) -> EventSubscriber {
        let subscriber = EventSubscriber {
            receiver: self.sender.subscribe(),
        };
        debug!(subscribers = self.subscriber_count(), "Event subscriber attached");
        subscriber
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
}

impl EventSubscriber {
    /// Next event, or `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Event subscriber lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::notifications::events::BookingDeletedEvent;

    fn deleted(booking_id: i32) -> Event {
        Event::BookingDeleted(BookingDeletedEvent {
            booking_id,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn published_event_reaches_every_subscriber() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(deleted(42)), 2);

        for subscriber in [&mut first, &mut second] {
            let received = tokio::time::timeout(Duration::from_millis(100), subscriber.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(received.event.event_type(), "booking_deleted");
            assert_eq!(received.event.booking_id(), 42);
        }
    }

    #[test]
    fn publish_without_subscribers_delivers_nothing() {
        let bus = EventBus::with_capacity(4);
        assert_eq!(bus.publish(deleted(1)), 0);
    }

    #[test]
    fn subscriber_count_follows_drops() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let _second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn lagging_subscriber_resumes_with_newest_events() {
        let bus = EventBus::with_capacity(2);
        let mut subscriber = bus.subscribe();
        for id in 1..=5 {
            bus.publish(deleted(id));
        }

        let next = subscriber.recv().await.unwrap();
        assert_eq!(next.event.booking_id(), 4);
    }
}
