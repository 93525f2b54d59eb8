//! Domain layer: hotel aggregates and their repository interfaces

pub mod booking;
pub mod customer;
pub mod employee;
pub mod repositories;
pub mod room;

pub use booking::{Booking, LedgerRow, PaymentMethod, RoomBooking, StayStatus};
pub use customer::Customer;
pub use employee::Employee;
pub use repositories::{DomainResult, RepositoryProvider};
pub use room::{Room, RoomStatus};

pub use crate::shared::errors::DomainError;
