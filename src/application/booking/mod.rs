//! Booking engine: occupancy, conflict detection, pricing and lifecycle

pub mod conflict;
pub mod locks;
pub mod occupancy;
pub mod pricing;
pub mod service;

pub use conflict::check_conflict;
pub use locks::RoomLocks;
pub use occupancy::{anchor, resolve_occupied_nights, stay_bounds, MAX_NIGHTS};
pub use pricing::{booking_total, compute_room_booking_amount};
pub use service::{BookingService, CreateBookingRequest, StayRequest, UpdateBookingRequest};
