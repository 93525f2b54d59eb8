//! Bookings, stays, check-in/out and the booking summary

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
