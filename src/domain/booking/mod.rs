//! Booking aggregate
//!
//! A booking owns its room-bookings (stays). Rooms and customers are only referenced.

pub mod model;
pub mod repository;

pub use model::{
    Booking, BookingChanges, BookingFilter, LedgerRow, NewBooking, NewRoomBooking, PaymentMethod,
    RoomBooking, RoomBookingChanges, StayStatus,
};
pub use repository::BookingRepository;
