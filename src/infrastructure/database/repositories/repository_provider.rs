//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::customer::CustomerRepository;
use crate::domain::employee::EmployeeRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::room::RoomRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::customer_repository::SeaOrmCustomerRepository;
use super::employee_repository::SeaOrmEmployeeRepository;
use super::room_repository::SeaOrmRoomRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let room = repos.rooms().find_by_id(12).await?;
/// let stays = repos.bookings().booked_room_bookings(12).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    rooms: SeaOrmRoomRepository,
    bookings: SeaOrmBookingRepository,
    customers: SeaOrmCustomerRepository,
    employees: SeaOrmEmployeeRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            rooms: SeaOrmRoomRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            customers: SeaOrmCustomerRepository::new(db.clone()),
            employees: SeaOrmEmployeeRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn rooms(&self) -> &dyn RoomRepository {
        &self.rooms
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn customers(&self) -> &dyn CustomerRepository {
        &self.customers
    }

    fn employees(&self) -> &dyn EmployeeRepository {
        &self.employees
    }
}
