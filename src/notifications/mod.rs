//! Notifications module
//!
//! Booking lifecycle events on an in-process broadcast bus. Consumers are the
//! receipt worker and the `/api/v1/notifications/ws` WebSocket endpoint, which
//! accepts optional `event_types` (comma separated) and `booking_id` filters.
//!
//! ```ignore
//! let event_bus = create_event_bus();
//! event_bus.publish(Event::BookingDeleted(BookingDeletedEvent {
//!     booking_id: 42,
//!     timestamp: Utc::now(),
//! }));
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
