//! Room aggregate

pub mod model;
pub mod repository;

pub use model::{NewRoom, Room, RoomSearch, RoomStatus, RoomUpdate};
pub use repository::RoomRepository;
