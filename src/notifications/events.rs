//! Notification events
//!
//! Booking lifecycle events broadcast to the receipt worker and WebSocket clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PaymentMethod;

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Booking and its stays committed
    BookingCreated(BookingCreatedEvent),
    /// Booking / stay pair updated
    BookingUpdated(BookingUpdatedEvent),
    /// Booking settled
    BookingPaid(BookingPaidEvent),
    /// Guest checked into a room
    RoomCheckedIn(StayEvent),
    /// Guest checked out, or a reservation released
    RoomCheckedOut(StayEvent),
    /// Booking and its stays removed
    BookingDeleted(BookingDeletedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingCreated(_) => "booking_created",
            Event::BookingUpdated(_) => "booking_updated",
            Event::BookingPaid(_) => "booking_paid",
            Event::RoomCheckedIn(_) => "room_checked_in",
            Event::RoomCheckedOut(_) => "room_checked_out",
            Event::BookingDeleted(_) => "booking_deleted",
        }
    }

    pub fn booking_id(&self) -> i32 {
        match self {
            Event::BookingCreated(e) => e.booking_id,
            Event::BookingUpdated(e) => e.booking_id,
            Event::BookingPaid(e) => e.booking_id,
            Event::RoomCheckedIn(e) | Event::RoomCheckedOut(e) => e.booking_id,
            Event::BookingDeleted(e) => e.booking_id,
        }
    }

    /// Whether a receipt should be issued for this event
    pub fn wants_receipt(&self) -> bool {
        matches!(self, Event::BookingCreated(_) | Event::BookingUpdated(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreatedEvent {
    pub booking_id: i32,
    pub customer_id: Option<i32>,
    pub receptionist: Option<i32>,
    pub room_ids: Vec<i32>,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingUpdatedEvent {
    pub booking_id: i32,
    pub room_booking_id: i32,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPaidEvent {
    pub booking_id: i32,
    pub payment_method: PaymentMethod,
    pub timestamp: DateTime<Utc>,
}

/// Check-in / check-out of one stay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayEvent {
    pub booking_id: i32,
    pub room_booking_id: i32,
    pub room_id: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDeletedEvent {
    pub booking_id: i32,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_type_tag() {
        let msg = EventMessage::new(Event::RoomCheckedIn(StayEvent {
            booking_id: 3,
            room_booking_id: 9,
            room_id: 101,
            timestamp: Utc::now(),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "RoomCheckedIn");
        assert_eq!(json["data"]["room_booking_id"], 9);
        assert_eq!(msg.event.event_type(), "room_checked_in");
        assert_eq!(msg.event.booking_id(), 3);
    }

    #[test]
    fn only_created_and_updated_issue_receipts() {
        let deleted = Event::BookingDeleted(BookingDeletedEvent {
            booking_id: 1,
            timestamp: Utc::now(),
        });
        let updated = Event::BookingUpdated(BookingUpdatedEvent {
            booking_id: 1,
            room_booking_id: 2,
            amount: 100,
            timestamp: Utc::now(),
        });
        assert!(!deleted.wants_receipt());
        assert!(updated.wants_receipt());
    }
}
