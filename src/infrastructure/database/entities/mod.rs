//! Database entities module

pub mod booking;
pub mod customer;
pub mod employee;
pub mod room;
pub mod room_booking;

pub use booking::Entity as Booking;
pub use customer::Entity as Customer;
pub use employee::Entity as Employee;
pub use room::Entity as Room;
pub use room_booking::Entity as RoomBooking;
