//! Booking repository interface
//!
//! Every method that touches more than one row runs inside a single
//! database transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{
    Booking, BookingChanges, BookingFilter, LedgerRow, NewBooking, PaymentMethod, RoomBooking,
    RoomBookingChanges, StayStatus,
};
use crate::domain::room::Room;
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert the booking and all its stays atomically
    async fn create_with_room_bookings(&self, booking: NewBooking) -> DomainResult<Booking>;

    /// Booking with its stays attached
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>>;

    /// Non-deleted bookings matching the filter, newest first
    async fn find_all(&self, filter: &BookingFilter) -> DomainResult<Vec<Booking>>;

    async fn find_room_booking(&self, id: i32) -> DomainResult<Option<RoomBooking>>;

    /// Stays of a room that still hold their nights (not checked out)
    async fn booked_room_bookings(&self, room_id: i32) -> DomainResult<Vec<RoomBooking>>;

    /// All stays currently checked in, any room
    async fn checked_in_room_bookings(&self) -> DomainResult<Vec<RoomBooking>>;

    /// Update a booking and one of its stays atomically, then store the sum of
    /// all the booking's stay amounts as its amount in the same transaction
    async fn update_with_room_booking(
        &self,
        booking_id: i32,
        booking: BookingChanges,
        room_booking_id: i32,
        stay: RoomBookingChanges,
    ) -> DomainResult<Booking>;

    /// Move a stay from `from` to `to` and recompute its room's status,
    /// atomically. Fails with a validation error if the stay is no longer in `from`.
    async fn transition_stay(
        &self,
        room_booking_id: i32,
        from: StayStatus,
        to: StayStatus,
    ) -> DomainResult<(RoomBooking, Room)>;

    /// `None` when the booking does not exist
    async fn mark_paid(&self, id: i32, method: PaymentMethod) -> DomainResult<Option<Booking>>;

    /// Remove all stays, then the booking, atomically. `false` if absent.
    async fn delete_with_room_bookings(&self, id: i32) -> DomainResult<bool>;

    /// Stays starting and ending within `[start, end]`, joined with customer and room
    async fn ledger(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<LedgerRow>>;
}
