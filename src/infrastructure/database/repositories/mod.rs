//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod customer_repository;
pub mod employee_repository;
pub mod repository_provider;
pub mod room_repository;

pub use booking_repository::SeaOrmBookingRepository;
pub use customer_repository::SeaOrmCustomerRepository;
pub use employee_repository::SeaOrmEmployeeRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use room_repository::SeaOrmRoomRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

/// Map a store error onto the domain. Unique-key violations become `Conflict`.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => DomainError::Conflict(detail),
        _ => DomainError::Persistence(e.to_string()),
    }
}
